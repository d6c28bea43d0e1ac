//! Time and timestamp helpers.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// UTC timestamp used for observations, history points, events, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// The instant `days` whole days before `at`.
#[must_use]
pub fn days_before(at: Timestamp, days: u32) -> Timestamp {
    at - Duration::days(i64::from(days))
}

/// Calendar day (UTC) a timestamp falls on.
#[must_use]
pub fn utc_day(at: Timestamp) -> NaiveDate {
    at.date_naive()
}
