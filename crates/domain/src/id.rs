//! Random (v4) UUID identifiers for records the system creates itself.
//!
//! Store keys (`V1`, `B4`, `Mode`, ...) are not ids; they live in
//! [`crate::snapshot::StoreKey`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! uuid_ids {
    ($($(#[$meta:meta])* $name:ident;)+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            /// Accepts the text stored in SQLite `id` columns.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    )+};
}

uuid_ids! {
    /// Identity of an [`Event`](crate::event::Event) on the bus and the SSE stream.
    EventId;
    /// Row id of a recorded [`HistoryPoint`](crate::history::HistoryPoint).
    HistoryPointId;
    /// Row id of a [`SavedSchedule`](crate::schedule::SavedSchedule); kept across upserts.
    ScheduleId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_read_back_schedule_id_from_stored_text() {
        let id = ScheduleId::new();
        let stored = id.to_string();
        assert_eq!(stored.len(), 36);
        assert_eq!(stored.parse::<ScheduleId>().unwrap(), id);
    }

    #[test]
    fn should_reject_corrupted_history_point_id() {
        assert!("V1".parse::<HistoryPointId>().is_err());
    }

    #[test]
    fn should_serialize_event_id_as_plain_string() {
        let id = EventId::new();
        assert_eq!(
            serde_json::to_value(id).unwrap(),
            serde_json::Value::String(id.to_string())
        );
    }
}
