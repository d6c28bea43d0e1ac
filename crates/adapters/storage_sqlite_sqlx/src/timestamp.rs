//! Timestamp encoding for TEXT columns.
//!
//! Range queries compare timestamps as strings, so every stored value uses
//! the same fixed-width RFC 3339 form (UTC, microseconds, `Z` suffix).

use chrono::SecondsFormat;

use greenguard_domain::time::Timestamp;

pub(crate) fn encode(at: Timestamp) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode(text: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(text)
        .map(|at| at.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
