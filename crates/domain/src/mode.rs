//! Control mode: whether the threshold controller drives the actuators.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Global control mode, toggled by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Actuators only change on explicit user commands.
    #[default]
    Manual,
    /// The threshold controller runs on every snapshot ("AI Mode").
    Automatic,
}

impl ControlMode {
    /// Store encoding: `"1"` for automatic, `"0"` for manual.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Automatic => "1",
            Self::Manual => "0",
        }
    }

    /// Decode a raw store value; same lenient rules as actuator states.
    #[must_use]
    pub fn from_wire(value: &serde_json::Value) -> Option<Self> {
        crate::actuator::ActuatorState::from_wire(value).map(|state| {
            if state.is_on() {
                Self::Automatic
            } else {
                Self::Manual
            }
        })
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Manual => Self::Automatic,
            Self::Automatic => Self::Manual,
        }
    }

    #[must_use]
    pub fn is_automatic(self) -> bool {
        matches!(self, Self::Automatic)
    }
}

impl fmt::Display for ControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => f.write_str("Manual Mode"),
            Self::Automatic => f.write_str("AI Mode"),
        }
    }
}
