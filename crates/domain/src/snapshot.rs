//! Snapshot: one read of the store's flat root, parsed defensively.
//!
//! The store keeps every value at the root under short keys inherited from
//! the field hardware (`V1`…`V4` for sensors, `B2`…`B5` for actuators and
//! `Mode`). [`StoreKey`] owns that mapping; nothing else in the workspace
//! should spell the raw key strings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::actuator::{Actuator, ActuatorState, ActuatorStates};
use crate::mode::ControlMode;
use crate::sensor::{Sensor, SensorSnapshot, parse_reading};
use crate::time::Timestamp;

/// Raw root object as returned by the store.
pub type RawRoot = serde_json::Map<String, serde_json::Value>;

/// A key at the store root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Sensor(Sensor),
    Actuator(Actuator),
    Mode,
}

impl StoreKey {
    /// Every known key.
    pub const ALL: [Self; 9] = [
        Self::Sensor(Sensor::Temperature),
        Self::Sensor(Sensor::Humidity),
        Self::Sensor(Sensor::SoilMoisture),
        Self::Sensor(Sensor::LightIntensity),
        Self::Actuator(Actuator::Bulb),
        Self::Actuator(Actuator::Pump),
        Self::Actuator(Actuator::Fan),
        Self::Actuator(Actuator::Lid),
        Self::Mode,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sensor(Sensor::Temperature) => "V1",
            Self::Sensor(Sensor::Humidity) => "V2",
            Self::Sensor(Sensor::SoilMoisture) => "V3",
            Self::Sensor(Sensor::LightIntensity) => "V4",
            Self::Actuator(Actuator::Bulb) => "B2",
            Self::Actuator(Actuator::Pump) => "B3",
            Self::Actuator(Actuator::Fan) => "B4",
            Self::Actuator(Actuator::Lid) => "B5",
            Self::Mode => "Mode",
        }
    }

    /// Reverse lookup of [`as_str`](Self::as_str).
    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|candidate| candidate.as_str() == key)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed view of the store root at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sensors: SensorSnapshot,
    pub actuators: ActuatorStates,
    /// `None` when the store has no usable `Mode` value.
    pub mode: Option<ControlMode>,
    pub observed_at: Timestamp,
}

impl Snapshot {
    /// Parse a raw root. Missing or malformed values become unknown.
    #[must_use]
    pub fn from_root(root: &RawRoot, observed_at: Timestamp) -> Self {
        let mut sensors = SensorSnapshot::default();
        for sensor in Sensor::ALL {
            let value = root
                .get(StoreKey::Sensor(sensor).as_str())
                .and_then(parse_reading);
            sensors.set(sensor, value);
        }

        let mut actuators = ActuatorStates::default();
        for actuator in Actuator::ALL {
            let value = root
                .get(StoreKey::Actuator(actuator).as_str())
                .and_then(ActuatorState::from_wire);
            actuators.set(actuator, value);
        }

        let mode = root
            .get(StoreKey::Mode.as_str())
            .and_then(ControlMode::from_wire);

        Self {
            sensors,
            actuators,
            mode,
            observed_at,
        }
    }

    /// Encode back into the store's wire representation.
    ///
    /// Unknown values are omitted; readings are written as numbers,
    /// actuator states and the mode as `"0"` / `"1"` strings.
    #[must_use]
    pub fn to_root(&self) -> RawRoot {
        let mut root = RawRoot::new();
        for sensor in Sensor::ALL {
            if let Some(value) = self
                .sensors
                .get(sensor)
                .and_then(serde_json::Number::from_f64)
            {
                root.insert(
                    StoreKey::Sensor(sensor).as_str().to_string(),
                    serde_json::Value::Number(value),
                );
            }
        }
        for actuator in Actuator::ALL {
            if let Some(state) = self.actuators.get(actuator) {
                root.insert(
                    StoreKey::Actuator(actuator).as_str().to_string(),
                    serde_json::Value::String(state.as_wire().to_string()),
                );
            }
        }
        if let Some(mode) = self.mode {
            root.insert(
                StoreKey::Mode.as_str().to_string(),
                serde_json::Value::String(mode.as_wire().to_string()),
            );
        }
        root
    }

    /// Effective mode: an unknown mode counts as manual.
    #[must_use]
    pub fn effective_mode(&self) -> ControlMode {
        self.mode.unwrap_or_default()
    }
}
