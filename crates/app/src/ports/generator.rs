//! Schedule generator port: the external structured-text capability.
//!
//! A generator turns a [`ScheduleRequest`] into raw slot entries. Its output
//! is untrusted: the schedule service validates it and falls back to a
//! conservative day when it is unusable.

use std::future::Future;

use greenguard_domain::error::GreenGuardError;
use greenguard_domain::schedule::{ScheduleEntry, ScheduleRequest};

/// Produces one day of schedule entries.
pub trait ScheduleGenerator {
    fn generate(
        &self,
        request: ScheduleRequest,
    ) -> impl Future<Output = Result<Vec<ScheduleEntry>, GreenGuardError>> + Send;
}

impl<T: ScheduleGenerator + Send + Sync> ScheduleGenerator for std::sync::Arc<T> {
    fn generate(
        &self,
        request: ScheduleRequest,
    ) -> impl Future<Output = Result<Vec<ScheduleEntry>, GreenGuardError>> + Send {
        (**self).generate(request)
    }
}
