//! Threshold controller: the automatic ("AI Mode") control loop.
//!
//! The controller subscribes to the event bus and, for each
//! `SnapshotChanged` event, plans the desired actuator states from the
//! snapshot and issues one write per actuator whose state must change.
//! Writes run concurrently; a failing write is logged and published as
//! `ActuatorWriteFailed` without holding back the others. Nothing is
//! retried: the next snapshot naturally produces the same command again.
//!
//! After a pass with at least one successful write the sink is flushed
//! once, which publishes the resulting snapshot. That snapshot reaches the
//! controller again and plans nothing. Snapshots queued while a pass was
//! running are stale by then, so only the newest one is evaluated.

use tokio::sync::broadcast;

use greenguard_domain::actuator::{Actuator, ActuatorState};
use greenguard_domain::control::{self, Command, ControlPlan};
use greenguard_domain::error::error_chain;
use greenguard_domain::event::{Event, EventPayload};
use greenguard_domain::snapshot::Snapshot;
use greenguard_domain::thresholds::ThresholdConfig;

use crate::ports::{ActuatorCommandSink, EventPublisher};

/// A write that the sink rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCommand {
    pub command: Command,
    pub reason: String,
}

/// What one controller pass did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlReport {
    /// The snapshot's mode is not automatic; nothing was evaluated.
    Skipped,
    Applied {
        plan: ControlPlan,
        succeeded: Vec<Command>,
        failed: Vec<FailedCommand>,
    },
}

impl ControlReport {
    /// Commands that were attempted, successful or not.
    #[must_use]
    pub fn attempted(&self) -> usize {
        match self {
            Self::Skipped => 0,
            Self::Applied {
                succeeded, failed, ..
            } => succeeded.len() + failed.len(),
        }
    }
}

/// Reactive rule-based controller.
pub struct ThresholdController<K, P> {
    thresholds: ThresholdConfig,
    sink: K,
    publisher: P,
}

impl<K, P> ThresholdController<K, P>
where
    K: ActuatorCommandSink,
    P: EventPublisher,
{
    /// Create a new controller.
    pub fn new(thresholds: ThresholdConfig, sink: K, publisher: P) -> Self {
        Self {
            thresholds,
            sink,
            publisher,
        }
    }

    /// Run one pass over a snapshot.
    pub async fn process(&self, snapshot: &Snapshot) -> ControlReport {
        if !snapshot.effective_mode().is_automatic() {
            tracing::trace!("manual mode, controller pass skipped");
            return ControlReport::Skipped;
        }

        let plan = control::plan(&self.thresholds, &snapshot.sensors, &snapshot.actuators);
        if plan.is_noop() {
            tracing::trace!(desired = ?plan.desired, "actuators already in desired state");
            return ControlReport::Applied {
                plan,
                succeeded: Vec::new(),
                failed: Vec::new(),
            };
        }

        tracing::debug!(commands = ?plan.commands, "applying controller plan");
        let (fan, lid, pump, bulb) = tokio::join!(
            self.apply(Actuator::Fan, plan.command_for(Actuator::Fan)),
            self.apply(Actuator::Lid, plan.command_for(Actuator::Lid)),
            self.apply(Actuator::Pump, plan.command_for(Actuator::Pump)),
            self.apply(Actuator::Bulb, plan.command_for(Actuator::Bulb)),
        );

        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for outcome in [fan, lid, pump, bulb].into_iter().flatten() {
            match outcome {
                Ok(command) => succeeded.push(command),
                Err(failure) => failed.push(failure),
            }
        }

        if !succeeded.is_empty()
            && let Err(err) = self.sink.flush().await
        {
            tracing::warn!(error = %error_chain(&err), "failed to publish state after controller pass");
        }

        ControlReport::Applied {
            plan,
            succeeded,
            failed,
        }
    }

    async fn apply(
        &self,
        actuator: Actuator,
        state: Option<ActuatorState>,
    ) -> Option<Result<Command, FailedCommand>> {
        let state = state?;
        let command = Command { actuator, state };
        match self.sink.switch(actuator, state).await {
            Ok(()) => Some(Ok(command)),
            Err(err) => {
                let reason = error_chain(&err);
                tracing::error!(%actuator, %state, error = %reason, "actuator write failed");
                let event = Event::new(EventPayload::ActuatorWriteFailed {
                    actuator,
                    state,
                    reason: reason.clone(),
                });
                if let Err(err) = self.publisher.publish(event).await {
                    tracing::warn!(error = %err, "failed to publish write failure");
                }
                Some(Err(FailedCommand { command, reason }))
            }
        }
    }

    /// Consume bus events until the bus closes.
    ///
    /// Only `SnapshotChanged` events trigger a pass. A lagging receiver
    /// logs how many events it missed and carries on with the next one.
    pub async fn run(self, mut events: broadcast::Receiver<Event>) {
        tracing::info!(thresholds = ?self.thresholds, "threshold controller started");
        loop {
            match events.recv().await {
                Ok(event) => {
                    let Some(snapshot) = newest_snapshot(event, &mut events) else {
                        continue;
                    };
                    let report = self.process(&snapshot).await;
                    if report.attempted() > 0 {
                        tracing::debug!(attempted = report.attempted(), "controller pass done");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "controller lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::info!("threshold controller stopped");
    }
}

/// The last snapshot among `first` and the events already queued behind it.
fn newest_snapshot(first: Event, events: &mut broadcast::Receiver<Event>) -> Option<Snapshot> {
    let mut newest = into_snapshot(first);
    loop {
        match events.try_recv() {
            Ok(event) => {
                if let Some(snapshot) = into_snapshot(event) {
                    newest = Some(snapshot);
                }
            }
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "controller lagged behind the event bus");
            }
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                return newest;
            }
        }
    }
}

fn into_snapshot(event: Event) -> Option<Snapshot> {
    match event.payload {
        EventPayload::SnapshotChanged { snapshot } => Some(snapshot),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::InProcessEventBus;
    use crate::ports::GreenhouseStore;
    use crate::services::greenhouse_service::GreenhouseService;
    use greenguard_domain::actuator::ActuatorStates;
    use greenguard_domain::error::GreenGuardError;
    use greenguard_domain::event::CommandOrigin;
    use greenguard_domain::mode::ControlMode;
    use greenguard_domain::sensor::SensorSnapshot;
    use greenguard_domain::snapshot::{RawRoot, StoreKey};
    use greenguard_domain::time::now;
    use std::future::Future;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // ── Sink that applies writes to an in-memory state table ───────

    #[derive(Default)]
    struct RecordingSink {
        states: Mutex<ActuatorStates>,
        writes: Mutex<Vec<Command>>,
        flushes: Mutex<usize>,
        failing: Option<Actuator>,
    }

    impl RecordingSink {
        fn failing(actuator: Actuator) -> Self {
            Self {
                failing: Some(actuator),
                ..Self::default()
            }
        }

        fn writes(&self) -> Vec<Command> {
            self.writes.lock().unwrap().clone()
        }

        fn flushes(&self) -> usize {
            *self.flushes.lock().unwrap()
        }
    }

    impl ActuatorCommandSink for RecordingSink {
        fn switch(
            &self,
            actuator: Actuator,
            state: ActuatorState,
        ) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
            self.writes.lock().unwrap().push(Command { actuator, state });
            let result = if self.failing == Some(actuator) {
                Err(GreenGuardError::Storage("connection reset".into()))
            } else {
                self.states.lock().unwrap().set(actuator, Some(state));
                Ok(())
            };
            async { result }
        }

        fn flush(&self) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
            *self.flushes.lock().unwrap() += 1;
            async { Ok(()) }
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<Event>>,
    }

    impl EventPublisher for RecordingPublisher {
        fn publish(&self, event: Event) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
            self.events.lock().unwrap().push(event);
            async { Ok(()) }
        }
    }

    type TestController = ThresholdController<Arc<RecordingSink>, Arc<RecordingPublisher>>;

    fn controller(sink: RecordingSink) -> (TestController, Arc<RecordingSink>, Arc<RecordingPublisher>) {
        let sink = Arc::new(sink);
        let publisher = Arc::new(RecordingPublisher::default());
        let controller =
            ThresholdController::new(ThresholdConfig::default(), sink.clone(), publisher.clone());
        (controller, sink, publisher)
    }

    fn hot_humid_dry_dark(mode: Option<ControlMode>, actuators: ActuatorStates) -> Snapshot {
        Snapshot {
            sensors: SensorSnapshot {
                temperature: Some(30.0),
                humidity: Some(80.0),
                soil_moisture: Some(20.0),
                light_intensity: Some(2000.0),
            },
            actuators,
            mode,
            observed_at: now(),
        }
    }

    #[tokio::test]
    async fn should_switch_all_four_actuators_on_in_automatic_mode() {
        let (controller, sink, _) = controller(RecordingSink::default());
        let snapshot = hot_humid_dry_dark(Some(ControlMode::Automatic), ActuatorStates::all_off());

        let report = controller.process(&snapshot).await;

        assert_eq!(report.attempted(), 4);
        let mut writes = sink.writes();
        writes.sort_by_key(|command| command.actuator);
        assert_eq!(
            writes,
            Actuator::ALL
                .map(|actuator| Command {
                    actuator,
                    state: ActuatorState::On
                })
                .to_vec()
        );
    }

    #[tokio::test]
    async fn should_not_write_in_manual_mode() {
        let (controller, sink, _) = controller(RecordingSink::default());
        let snapshot = hot_humid_dry_dark(Some(ControlMode::Manual), ActuatorStates::all_off());

        let report = controller.process(&snapshot).await;

        assert_eq!(report, ControlReport::Skipped);
        assert!(sink.writes().is_empty());
    }

    #[tokio::test]
    async fn should_treat_unknown_mode_as_manual() {
        let (controller, sink, _) = controller(RecordingSink::default());
        let snapshot = hot_humid_dry_dark(None, ActuatorStates::all_off());

        assert_eq!(controller.process(&snapshot).await, ControlReport::Skipped);
        assert!(sink.writes().is_empty());
    }

    #[tokio::test]
    async fn should_write_nothing_on_second_pass_over_updated_store() {
        let (controller, sink, _) = controller(RecordingSink::default());
        let first = hot_humid_dry_dark(Some(ControlMode::Automatic), ActuatorStates::all_off());
        controller.process(&first).await;
        assert_eq!(sink.writes().len(), 4);

        let applied = *sink.states.lock().unwrap();
        let second = hot_humid_dry_dark(Some(ControlMode::Automatic), applied);
        let report = controller.process(&second).await;

        assert_eq!(report.attempted(), 0);
        assert_eq!(sink.writes().len(), 4);
    }

    #[tokio::test]
    async fn should_attempt_other_writes_when_one_fails() {
        let (controller, sink, publisher) = controller(RecordingSink::failing(Actuator::Lid));
        let snapshot = hot_humid_dry_dark(Some(ControlMode::Automatic), ActuatorStates::all_off());

        let report = controller.process(&snapshot).await;

        assert_eq!(sink.writes().len(), 4);
        let ControlReport::Applied {
            succeeded, failed, ..
        } = report
        else {
            panic!("expected an applied report");
        };
        assert_eq!(succeeded.len(), 3);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].command.actuator, Actuator::Lid);
        assert!(failed[0].reason.contains("connection reset"));

        let events = publisher.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].payload,
            EventPayload::ActuatorWriteFailed {
                actuator: Actuator::Lid,
                state: ActuatorState::On,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn should_only_write_changed_actuators() {
        let (controller, sink, _) = controller(RecordingSink::default());
        let mut current = ActuatorStates::all_off();
        current.fan = Some(ActuatorState::On);
        current.pump = Some(ActuatorState::On);
        let snapshot = hot_humid_dry_dark(Some(ControlMode::Automatic), current);

        controller.process(&snapshot).await;

        let mut written: Vec<Actuator> = sink.writes().iter().map(|c| c.actuator).collect();
        written.sort();
        assert_eq!(written, [Actuator::Lid, Actuator::Bulb]);
    }

    #[tokio::test]
    async fn should_react_to_snapshot_events_until_bus_closes() {
        let (controller, sink, _) = controller(RecordingSink::default());
        let (tx, rx) = broadcast::channel(8);
        let task = tokio::spawn(controller.run(rx));

        tx.send(Event::new(EventPayload::ModeChanged {
            mode: ControlMode::Automatic,
        }))
        .unwrap();
        tx.send(Event::new(EventPayload::SnapshotChanged {
            snapshot: hot_humid_dry_dark(Some(ControlMode::Automatic), ActuatorStates::all_off()),
        }))
        .unwrap();
        drop(tx);

        task.await.unwrap();
        assert_eq!(sink.writes().len(), 4);
    }

    #[tokio::test]
    async fn should_flush_once_per_pass_with_writes() {
        let (controller, sink, _) = controller(RecordingSink::default());
        let snapshot = hot_humid_dry_dark(Some(ControlMode::Automatic), ActuatorStates::all_off());
        controller.process(&snapshot).await;
        assert_eq!(sink.flushes(), 1);

        let settled = hot_humid_dry_dark(
            Some(ControlMode::Automatic),
            ActuatorStates::uniform(ActuatorState::On),
        );
        controller.process(&settled).await;
        assert_eq!(sink.flushes(), 1);
    }

    #[tokio::test]
    async fn should_not_flush_when_every_write_failed() {
        let (controller, sink, _) = controller(RecordingSink::failing(Actuator::Fan));
        let mut current = ActuatorStates::uniform(ActuatorState::On);
        current.fan = Some(ActuatorState::Off);
        let snapshot = hot_humid_dry_dark(Some(ControlMode::Automatic), current);

        let report = controller.process(&snapshot).await;

        assert_eq!(report.attempted(), 1);
        assert_eq!(sink.flushes(), 0);
    }

    #[tokio::test]
    async fn should_evaluate_only_newest_of_queued_snapshots() {
        let (controller, sink, _) = controller(RecordingSink::default());
        let (tx, rx) = broadcast::channel(8);
        let task = tokio::spawn(controller.run(rx));

        let stale = hot_humid_dry_dark(Some(ControlMode::Automatic), ActuatorStates::all_off());
        let current = hot_humid_dry_dark(
            Some(ControlMode::Automatic),
            ActuatorStates::uniform(ActuatorState::On),
        );
        for snapshot in [stale, current] {
            tx.send(Event::new(EventPayload::SnapshotChanged { snapshot }))
                .unwrap();
        }
        drop(tx);

        task.await.unwrap();
        assert!(sink.writes().is_empty());
    }

    // ── Wired through the greenhouse service and the real bus ──────

    #[derive(Default)]
    struct MemoryStore {
        root: Mutex<RawRoot>,
    }

    impl GreenhouseStore for MemoryStore {
        fn read_root(&self) -> impl Future<Output = Result<RawRoot, GreenGuardError>> + Send {
            let root = self.root.lock().unwrap().clone();
            async { Ok(root) }
        }

        fn write(
            &self,
            key: StoreKey,
            value: serde_json::Value,
        ) -> impl Future<Output = Result<(), GreenGuardError>> + Send {
            self.root
                .lock()
                .unwrap()
                .insert(key.as_str().to_string(), value);
            async { Ok(()) }
        }
    }

    #[tokio::test]
    async fn should_switch_each_actuator_once_per_reading_change() {
        let bus = Arc::new(InProcessEventBus::new(64));
        let greenhouse = Arc::new(GreenhouseService::new(
            MemoryStore::default(),
            Arc::clone(&bus),
        ));
        let controller = ThresholdController::new(
            ThresholdConfig::default(),
            Arc::clone(&greenhouse),
            Arc::clone(&bus),
        );
        let mut observer = bus.subscribe();
        let task = tokio::spawn(controller.run(bus.subscribe()));

        greenhouse.set_mode(ControlMode::Automatic).await.unwrap();
        greenhouse
            .ingest_readings(SensorSnapshot {
                temperature: Some(30.0),
                humidity: Some(80.0),
                soil_moisture: Some(20.0),
                light_intensity: Some(2000.0),
            })
            .await
            .unwrap();

        for _ in 0..100 {
            let actuators = greenhouse.snapshot().await.unwrap().actuators;
            if actuators == ActuatorStates::uniform(ActuatorState::On) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        // Give any follow-up pass time to run before counting.
        tokio::time::sleep(Duration::from_millis(100)).await;
        task.abort();

        let mut automatic = Vec::new();
        let mut snapshots = 0;
        while let Ok(event) = observer.try_recv() {
            match event.payload {
                EventPayload::ActuatorChanged {
                    actuator,
                    origin: CommandOrigin::Automatic,
                    ..
                } => automatic.push(actuator),
                EventPayload::SnapshotChanged { .. } => snapshots += 1,
                _ => {}
            }
        }
        automatic.sort();
        let mut expected = Actuator::ALL.to_vec();
        expected.sort();
        assert_eq!(automatic, expected);
        assert_eq!(snapshots, 3);
    }
}
