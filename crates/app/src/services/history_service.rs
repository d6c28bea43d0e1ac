//! History service: records readings and serves daily aggregates.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

use greenguard_domain::error::{GreenGuardError, ValidationError};
use greenguard_domain::event::{Event, EventPayload};
use greenguard_domain::history::{DailySummary, HistoryPoint, ScheduleInputs, summarize_daily};
use greenguard_domain::snapshot::Snapshot;
use greenguard_domain::time::{days_before, now};

use crate::ports::SensorHistoryRepository;

/// Longest window served by [`HistoryService::daily_summaries`].
pub const MAX_SUMMARY_DAYS: u32 = 30;

/// Window used to derive schedule generation inputs.
pub const SCHEDULE_INPUT_DAYS: u32 = 7;

/// Application service for sensor history.
pub struct HistoryService<R> {
    repo: R,
}

impl<R: SensorHistoryRepository> HistoryService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Store the snapshot's readings. Snapshots without any reading are
    /// skipped and yield `None`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn record(&self, snapshot: &Snapshot) -> Result<Option<HistoryPoint>, GreenGuardError> {
        if snapshot.sensors.is_empty() {
            return Ok(None);
        }
        let point = HistoryPoint::new(snapshot.observed_at, snapshot.sensors);
        self.repo.record(point).await.map(Some)
    }

    /// Per-day means over the last `days` days, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] unless `1 <= days <= 30`, or a
    /// storage error from the repository.
    pub async fn daily_summaries(&self, days: u32) -> Result<Vec<DailySummary>, GreenGuardError> {
        if !(1..=MAX_SUMMARY_DAYS).contains(&days) {
            return Err(ValidationError::OutOfRange {
                field: "days",
                min: 1,
                max: MAX_SUMMARY_DAYS,
                actual: days,
            }
            .into());
        }
        let to = now();
        let points = self.repo.find_in_range(days_before(to, days), to).await?;
        Ok(summarize_daily(&points))
    }

    /// Generator inputs from the last seven days.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the repository.
    pub async fn schedule_inputs(&self) -> Result<ScheduleInputs, GreenGuardError> {
        let days = self.daily_summaries(SCHEDULE_INPUT_DAYS).await?;
        let readings: Vec<_> = days.into_iter().map(|day| day.sensors).collect();
        Ok(ScheduleInputs::from_daily(&readings))
    }

    /// Delete points older than `retention_days`.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the repository.
    pub async fn purge_older_than(&self, retention_days: u32) -> Result<u64, GreenGuardError> {
        let removed = self.repo.purge_before(days_before(now(), retention_days)).await?;
        if removed > 0 {
            tracing::info!(removed, retention_days, "old history points purged");
        }
        Ok(removed)
    }

    /// Record `SnapshotChanged` events, at most one point per `interval`.
    ///
    /// Returns when the bus closes. Storage failures are logged and the
    /// snapshot is dropped; the next one is tried as usual.
    pub async fn run_recorder(&self, mut events: broadcast::Receiver<Event>, interval: Duration) {
        let mut last_recorded: Option<Instant> = None;
        loop {
            match events.recv().await {
                Ok(Event {
                    payload: EventPayload::SnapshotChanged { snapshot },
                    ..
                }) => {
                    if last_recorded.is_some_and(|at| at.elapsed() < interval) {
                        continue;
                    }
                    match self.record(&snapshot).await {
                        Ok(Some(_)) => last_recorded = Some(Instant::now()),
                        Ok(None) => {}
                        Err(err) => tracing::warn!(error = %err, "failed to record history point"),
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "history recorder lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Purge once per `every`, forever.
    pub async fn run_pruner(&self, retention_days: u32, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(err) = self.purge_older_than(retention_days).await {
                tracing::warn!(error = %err, "history purge failed");
            }
        }
    }
}
