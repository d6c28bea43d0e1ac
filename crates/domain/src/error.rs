//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`GreenGuardError`] via `#[from]` (or an explicit `From` impl for
//! adapter errors boxed into [`GreenGuardError::Storage`]).

/// Top-level error shared by every port and service.
#[derive(Debug, thiserror::Error)]
pub enum GreenGuardError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("generation error")]
    Generation(#[from] GenerationError),
}

/// Render an error followed by its sources, `: `-separated.
#[must_use]
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// A domain invariant was violated by the caller's input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{device} data not available")]
    StateUnavailable { device: &'static str },

    #[error("unknown actuator {0:?}")]
    UnknownActuator(String),

    #[error("no sensor readings supplied")]
    NoReadings,

    #[error("unknown schedule source {0:?}")]
    UnknownScheduleSource(String),

    #[error("owner must not be empty")]
    EmptyOwner,

    #[error("day label must not be empty")]
    EmptyDayLabel,

    #[error("schedule must contain {expected} entries, got {actual}")]
    ScheduleLength { expected: usize, actual: usize },

    #[error("schedule entry {index} must be at {expected}, got {actual}")]
    SlotTime {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("slot index {0} is out of range")]
    SlotOutOfRange(usize),

    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("{field} must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: &'static str,
        min: u32,
        max: u32,
        actual: u32,
    },

    #[error("threshold {low} must be below {high}")]
    ThresholdOrder {
        low: &'static str,
        high: &'static str,
    },

    #[error("threshold {0} must be a finite number")]
    ThresholdNotFinite(&'static str),
}

/// A lookup did not find the requested record.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// The external schedule generator failed or returned unusable output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("generator returned no entries")]
    Empty,

    #[error("generator unavailable: {0}")]
    Unavailable(String),

    #[error("generator output rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_name_device_when_state_unavailable() {
        let err = ValidationError::StateUnavailable { device: "Fan" };
        assert_eq!(err.to_string(), "Fan data not available");
    }

    #[test]
    fn should_convert_validation_error_into_top_level_error() {
        let err: GreenGuardError = ValidationError::EmptyOwner.into();
        assert!(matches!(
            err,
            GreenGuardError::Validation(ValidationError::EmptyOwner)
        ));
    }

    #[test]
    fn should_render_error_with_sources() {
        let err: GreenGuardError = ValidationError::EmptyDayLabel.into();
        assert_eq!(
            error_chain(&err),
            "validation error: day label must not be empty"
        );
    }

    #[test]
    fn should_display_not_found_error() {
        let err = NotFoundError {
            entity: "Schedule",
            id: "alice/today".to_string(),
        };
        assert_eq!(err.to_string(), "Schedule alice/today not found");
    }
}
