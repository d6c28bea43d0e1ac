//! Schedule repository port: persistence for saved daily schedules.

use std::future::Future;

use greenguard_domain::error::GreenGuardError;
use greenguard_domain::schedule::SavedSchedule;

/// Repository for [`SavedSchedule`]s, keyed by owner and day label.
pub trait ScheduleRepository {
    /// Insert or replace the schedule for `(owner, day)`.
    ///
    /// When a schedule already exists for the key, its id is kept and the
    /// returned value carries it.
    fn upsert(
        &self,
        schedule: SavedSchedule,
    ) -> impl Future<Output = Result<SavedSchedule, GreenGuardError>> + Send;

    fn get(
        &self,
        owner: &str,
        day: &str,
    ) -> impl Future<Output = Result<Option<SavedSchedule>, GreenGuardError>> + Send;

    /// All schedules of an owner, ordered by day label.
    fn list_by_owner(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<SavedSchedule>, GreenGuardError>> + Send;
}

impl<T: ScheduleRepository + Send + Sync> ScheduleRepository for std::sync::Arc<T> {
    fn upsert(
        &self,
        schedule: SavedSchedule,
    ) -> impl Future<Output = Result<SavedSchedule, GreenGuardError>> + Send {
        (**self).upsert(schedule)
    }

    fn get(
        &self,
        owner: &str,
        day: &str,
    ) -> impl Future<Output = Result<Option<SavedSchedule>, GreenGuardError>> + Send {
        (**self).get(owner, day)
    }

    fn list_by_owner(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<SavedSchedule>, GreenGuardError>> + Send {
        (**self).list_by_owner(owner)
    }
}
