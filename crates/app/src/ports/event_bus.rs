//! Event bus port: publish/subscribe for domain events.

use std::future::Future;

use greenguard_domain::error::GreenGuardError;
use greenguard_domain::event::Event;

/// Publishes domain events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), GreenGuardError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
        (**self).publish(event)
    }
}
