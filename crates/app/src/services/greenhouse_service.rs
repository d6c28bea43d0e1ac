//! Greenhouse service: use-cases over the store root.
//!
//! Every successful write is followed by a fresh read of the root and a
//! `SnapshotChanged` event, so subscribers (the threshold controller, the
//! history recorder, SSE clients) always see the store as it is, not as the
//! caller assumed it would be.

use std::future::Future;

use greenguard_domain::actuator::{Actuator, ActuatorState};
use greenguard_domain::error::{GreenGuardError, ValidationError};
use greenguard_domain::event::{CommandOrigin, Event, EventPayload};
use greenguard_domain::mode::ControlMode;
use greenguard_domain::sensor::{Sensor, SensorSnapshot};
use greenguard_domain::snapshot::{Snapshot, StoreKey};
use greenguard_domain::time::now;

use crate::ports::{ActuatorCommandSink, EventPublisher, GreenhouseStore};

/// Application service for reading and driving the greenhouse.
pub struct GreenhouseService<S, P> {
    store: S,
    publisher: P,
}

impl<S: GreenhouseStore, P: EventPublisher> GreenhouseService<S, P> {
    /// Create a new service backed by the given store and publisher.
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    /// Read and parse the current store root.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn snapshot(&self) -> Result<Snapshot, GreenGuardError> {
        let root = self.store.read_root().await?;
        Ok(Snapshot::from_root(&root, now()))
    }

    /// Write every present reading, leaving absent ones untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NoReadings`] when `readings` is empty, or a
    /// storage error from the store.
    pub async fn ingest_readings(
        &self,
        readings: SensorSnapshot,
    ) -> Result<Snapshot, GreenGuardError> {
        if readings.is_empty() {
            return Err(ValidationError::NoReadings.into());
        }
        for sensor in Sensor::ALL {
            if let Some(value) = readings.get(sensor) {
                self.store
                    .write(StoreKey::Sensor(sensor), serde_json::Value::from(value))
                    .await?;
            }
        }
        tracing::debug!(?readings, "sensor readings ingested");
        self.publish_snapshot().await
    }

    /// Switch one actuator.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write or the follow-up read fails.
    pub async fn set_actuator(
        &self,
        actuator: Actuator,
        state: ActuatorState,
        origin: CommandOrigin,
    ) -> Result<Snapshot, GreenGuardError> {
        self.write_actuator(actuator, state, origin).await?;
        self.publish_snapshot().await
    }

    async fn write_actuator(
        &self,
        actuator: Actuator,
        state: ActuatorState,
        origin: CommandOrigin,
    ) -> Result<(), GreenGuardError> {
        self.store
            .write(
                StoreKey::Actuator(actuator),
                serde_json::Value::from(state.as_wire()),
            )
            .await?;
        tracing::info!(%actuator, %state, ?origin, "actuator switched");
        self.publish(EventPayload::ActuatorChanged {
            actuator,
            state,
            origin,
        })
        .await;
        Ok(())
    }

    /// Flip one actuator relative to its last known state.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::StateUnavailable`] when the current state is
    /// unknown, or a storage error from the store.
    pub async fn toggle_actuator(&self, actuator: Actuator) -> Result<Snapshot, GreenGuardError> {
        let current = self.snapshot().await?.actuators.get(actuator).ok_or(
            ValidationError::StateUnavailable {
                device: actuator.display_name(),
            },
        )?;
        self.set_actuator(actuator, current.toggled(), CommandOrigin::Manual)
            .await
    }

    /// Change the control mode.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write or the follow-up read fails.
    pub async fn set_mode(&self, mode: ControlMode) -> Result<Snapshot, GreenGuardError> {
        self.store
            .write(StoreKey::Mode, serde_json::Value::from(mode.as_wire()))
            .await?;
        tracing::info!(%mode, "control mode changed");
        self.publish(EventPayload::ModeChanged { mode }).await;
        self.publish_snapshot().await
    }

    /// Flip the control mode.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::StateUnavailable`] when the stored mode is
    /// unknown, or a storage error from the store.
    pub async fn toggle_mode(&self) -> Result<Snapshot, GreenGuardError> {
        let current = self
            .snapshot()
            .await?
            .mode
            .ok_or(ValidationError::StateUnavailable { device: "Mode" })?;
        self.set_mode(current.toggled()).await
    }

    async fn publish_snapshot(&self) -> Result<Snapshot, GreenGuardError> {
        let snapshot = self.snapshot().await?;
        self.publish(EventPayload::SnapshotChanged {
            snapshot: snapshot.clone(),
        })
        .await;
        Ok(snapshot)
    }

    async fn publish(&self, payload: EventPayload) {
        let event = Event::new(payload);
        let kind = event.kind();
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(error = %err, kind, "failed to publish event");
        }
    }
}

/// Controller writes share the store path of user commands, tagged as
/// automatic. The snapshot is published once per pass by `flush`, so a
/// pass of four writes yields one `SnapshotChanged`, not four.
impl<S, P> ActuatorCommandSink for GreenhouseService<S, P>
where
    S: GreenhouseStore + Sync,
    P: EventPublisher + Sync,
{
    fn switch(
        &self,
        actuator: Actuator,
        state: ActuatorState,
    ) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
        self.write_actuator(actuator, state, CommandOrigin::Automatic)
    }

    fn flush(&self) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
        async move { self.publish_snapshot().await.map(|_| ()) }
    }
}
