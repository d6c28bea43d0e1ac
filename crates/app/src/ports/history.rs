//! Sensor history port: time-series storage for recorded readings.

use std::future::Future;

use greenguard_domain::error::GreenGuardError;
use greenguard_domain::history::HistoryPoint;
use greenguard_domain::time::Timestamp;

/// Repository for persisting and querying [`HistoryPoint`]s.
pub trait SensorHistoryRepository {
    /// Append a point.
    fn record(
        &self,
        point: HistoryPoint,
    ) -> impl Future<Output = Result<HistoryPoint, GreenGuardError>> + Send;

    /// Points with `from <= recorded_at <= to`, oldest first.
    fn find_in_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<HistoryPoint>, GreenGuardError>> + Send;

    /// Delete points recorded strictly before `before`. Returns how many were removed.
    fn purge_before(
        &self,
        before: Timestamp,
    ) -> impl Future<Output = Result<u64, GreenGuardError>> + Send;
}

impl<T: SensorHistoryRepository + Send + Sync> SensorHistoryRepository for std::sync::Arc<T> {
    fn record(
        &self,
        point: HistoryPoint,
    ) -> impl Future<Output = Result<HistoryPoint, GreenGuardError>> + Send {
        (**self).record(point)
    }

    fn find_in_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<HistoryPoint>, GreenGuardError>> + Send {
        (**self).find_in_range(from, to)
    }

    fn purge_before(
        &self,
        before: Timestamp,
    ) -> impl Future<Output = Result<u64, GreenGuardError>> + Send {
        (**self).purge_before(before)
    }
}
