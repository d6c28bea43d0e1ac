//! Actuators: the four binary outputs of the greenhouse.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// One of the four controllable devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actuator {
    Fan,
    Lid,
    Pump,
    Bulb,
}

impl Actuator {
    /// All actuators in controller evaluation order (Lid depends on Fan).
    pub const ALL: [Self; 4] = [Self::Fan, Self::Lid, Self::Pump, Self::Bulb];

    /// Human-readable device name, used in notifications.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Fan => "Fan",
            Self::Lid => "Lid Motor",
            Self::Pump => "Water Pump",
            Self::Bulb => "Bulb",
        }
    }

    /// Lowercase identifier used in URLs and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fan => "fan",
            Self::Lid => "lid",
            Self::Pump => "pump",
            Self::Bulb => "bulb",
        }
    }
}

impl fmt::Display for Actuator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Actuator {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fan" => Ok(Self::Fan),
            "lid" => Ok(Self::Lid),
            "pump" => Ok(Self::Pump),
            "bulb" => Ok(Self::Bulb),
            _ => Err(ValidationError::UnknownActuator(s.to_string())),
        }
    }
}

/// Binary actuator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActuatorState {
    On,
    #[default]
    Off,
}

impl ActuatorState {
    /// Store encoding: `"1"` for on, `"0"` for off.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::On => "1",
            Self::Off => "0",
        }
    }

    /// Decode a raw store value.
    ///
    /// Accepts `"0"`/`"1"`, the numbers `0`/`1` and booleans. Anything else
    /// is unknown.
    #[must_use]
    pub fn from_wire(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(text) => match text.trim() {
                "1" => Some(Self::On),
                "0" => Some(Self::Off),
                _ => None,
            },
            serde_json::Value::Number(number) => match number.as_u64() {
                Some(1) => Some(Self::On),
                Some(0) => Some(Self::Off),
                _ => None,
            },
            serde_json::Value::Bool(flag) => Some(Self::from(*flag)),
            _ => None,
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }

    #[must_use]
    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

impl From<bool> for ActuatorState {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl fmt::Display for ActuatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
        }
    }
}

/// Last known state of every actuator. `None` means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorStates {
    pub fan: Option<ActuatorState>,
    pub lid: Option<ActuatorState>,
    pub pump: Option<ActuatorState>,
    pub bulb: Option<ActuatorState>,
}

impl ActuatorStates {
    /// Every actuator known and OFF.
    #[must_use]
    pub fn all_off() -> Self {
        Self::uniform(ActuatorState::Off)
    }

    #[must_use]
    pub fn uniform(state: ActuatorState) -> Self {
        Self {
            fan: Some(state),
            lid: Some(state),
            pump: Some(state),
            bulb: Some(state),
        }
    }

    #[must_use]
    pub fn get(&self, actuator: Actuator) -> Option<ActuatorState> {
        match actuator {
            Actuator::Fan => self.fan,
            Actuator::Lid => self.lid,
            Actuator::Pump => self.pump,
            Actuator::Bulb => self.bulb,
        }
    }

    pub fn set(&mut self, actuator: Actuator, state: Option<ActuatorState>) {
        match actuator {
            Actuator::Fan => self.fan = state,
            Actuator::Lid => self.lid = state,
            Actuator::Pump => self.pump = state,
            Actuator::Bulb => self.bulb = state,
        }
    }

    /// Last known state, treating unknown as OFF.
    #[must_use]
    pub fn effective(&self, actuator: Actuator) -> ActuatorState {
        self.get(actuator).unwrap_or_default()
    }
}
