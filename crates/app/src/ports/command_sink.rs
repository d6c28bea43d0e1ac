//! Command sink port: where the controller sends actuator writes.

use std::future::Future;

use greenguard_domain::actuator::{Actuator, ActuatorState};
use greenguard_domain::error::GreenGuardError;

/// Switches actuators on behalf of the controller.
///
/// Implementations must be safe to call concurrently for different
/// actuators; the controller issues its writes in parallel. A successful
/// `switch` means the value reached the store, nothing more.
pub trait ActuatorCommandSink {
    fn switch(
        &self,
        actuator: Actuator,
        state: ActuatorState,
    ) -> impl Future<Output = Result<(), GreenGuardError>> + Send;

    /// Called once after a pass in which at least one `switch` succeeded,
    /// so the resulting state is announced once rather than per write.
    fn flush(&self) -> impl Future<Output = Result<(), GreenGuardError>> + Send;
}

impl<T: ActuatorCommandSink + Send + Sync> ActuatorCommandSink for std::sync::Arc<T> {
    fn switch(
        &self,
        actuator: Actuator,
        state: ActuatorState,
    ) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
        (**self).switch(actuator, state)
    }

    fn flush(&self) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
        (**self).flush()
    }
}
