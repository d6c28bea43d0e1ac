//! In-process event bus backed by a tokio broadcast channel.
//!
//! Every background task (controller, history recorder) and every SSE
//! client holds its own receiver. A receiver that falls more than
//! `capacity` events behind sees `RecvError::Lagged` and resumes from the
//! oldest event still buffered.

use std::future::Future;

use tokio::sync::broadcast;

use greenguard_domain::error::GreenGuardError;
use greenguard_domain::event::Event;

use crate::ports::EventPublisher;

pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receiver for events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
        // An event nobody is subscribed to is dropped, not an error.
        if self.sender.send(event).is_err() {
            tracing::trace!("event published without subscribers");
        }
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenguard_domain::actuator::{Actuator, ActuatorState};
    use greenguard_domain::event::{CommandOrigin, EventPayload};
    use greenguard_domain::mode::ControlMode;

    fn switched(actuator: Actuator) -> Event {
        Event::new(EventPayload::ActuatorChanged {
            actuator,
            state: ActuatorState::On,
            origin: CommandOrigin::Automatic,
        })
    }

    #[tokio::test]
    async fn should_fan_out_events_in_publish_order() {
        let bus = InProcessEventBus::new(8);
        let mut controller = bus.subscribe();
        let mut recorder = bus.subscribe();

        bus.publish(switched(Actuator::Fan)).await.unwrap();
        bus.publish(switched(Actuator::Bulb)).await.unwrap();

        for rx in [&mut controller, &mut recorder] {
            assert!(matches!(
                rx.recv().await.unwrap().payload,
                EventPayload::ActuatorChanged { actuator: Actuator::Fan, .. }
            ));
            assert!(matches!(
                rx.recv().await.unwrap().payload,
                EventPayload::ActuatorChanged { actuator: Actuator::Bulb, .. }
            ));
        }
    }

    #[tokio::test]
    async fn should_accept_events_before_any_task_subscribes() {
        let bus = InProcessEventBus::new(8);
        bus.publish(Event::new(EventPayload::ModeChanged {
            mode: ControlMode::Automatic,
        }))
        .await
        .unwrap();

        let mut late = bus.subscribe();
        bus.publish(switched(Actuator::Pump)).await.unwrap();
        assert_eq!(late.recv().await.unwrap().kind(), "actuator_changed");
    }

    #[tokio::test]
    async fn should_report_lag_to_slow_subscriber() {
        let bus = InProcessEventBus::new(2);
        let mut slow = bus.subscribe();
        for actuator in Actuator::ALL {
            bus.publish(switched(actuator)).await.unwrap();
        }

        assert!(matches!(
            slow.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
        assert!(matches!(
            slow.recv().await.unwrap().payload,
            EventPayload::ActuatorChanged { actuator: Actuator::Pump, .. }
        ));
    }
}
