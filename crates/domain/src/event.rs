//! Event: an immutable record of something that happened.
//!
//! Events are produced when the store is updated, an actuator or the mode
//! changes, a controller write fails or a schedule is saved. They flow over
//! the in-process bus to the controller, the history recorder and SSE
//! clients.

use serde::{Deserialize, Serialize};

use crate::actuator::{Actuator, ActuatorState};
use crate::id::EventId;
use crate::mode::ControlMode;
use crate::snapshot::Snapshot;
use crate::time::{Timestamp, now};

/// Who asked for an actuator change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandOrigin {
    /// A user, through the API.
    Manual,
    /// The threshold controller.
    Automatic,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// The store root changed; carries the freshly parsed snapshot.
    SnapshotChanged { snapshot: Snapshot },
    ActuatorChanged {
        actuator: Actuator,
        state: ActuatorState,
        origin: CommandOrigin,
    },
    ModeChanged { mode: ControlMode },
    /// A controller write was rejected by the store.
    ActuatorWriteFailed {
        actuator: Actuator,
        state: ActuatorState,
        reason: String,
    },
    ScheduleSaved { owner: String, day: String },
}

/// Envelope around an [`EventPayload`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl Event {
    /// Stamp a payload with a fresh id and the current time.
    #[must_use]
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: EventId::new(),
            timestamp: now(),
            payload,
        }
    }

    /// Short name of the payload variant, used in logs and SSE event names.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self.payload {
            EventPayload::SnapshotChanged { .. } => "snapshot_changed",
            EventPayload::ActuatorChanged { .. } => "actuator_changed",
            EventPayload::ModeChanged { .. } => "mode_changed",
            EventPayload::ActuatorWriteFailed { .. } => "actuator_write_failed",
            EventPayload::ScheduleSaved { .. } => "schedule_saved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_stamp_unique_ids() {
        let a = Event::new(EventPayload::ModeChanged {
            mode: ControlMode::Automatic,
        });
        let b = Event::new(EventPayload::ModeChanged {
            mode: ControlMode::Automatic,
        });
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn should_serialize_with_type_tag() {
        let event = Event::new(EventPayload::ActuatorChanged {
            actuator: Actuator::Pump,
            state: ActuatorState::On,
            origin: CommandOrigin::Automatic,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "actuator_changed");
        assert_eq!(json["actuator"], "pump");
        assert_eq!(json["state"], "on");
        assert_eq!(json["origin"], "automatic");
        assert!(json.get("id").is_some());
    }

    #[test]
    fn should_deserialize_what_it_serializes() {
        let event = Event::new(EventPayload::ActuatorWriteFailed {
            actuator: Actuator::Lid,
            state: ActuatorState::Off,
            reason: "timeout".to_string(),
        });
        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn should_report_kind_matching_tag() {
        let event = Event::new(EventPayload::ScheduleSaved {
            owner: "alice".to_string(),
            day: "Day 1".to_string(),
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.kind());
    }
}
