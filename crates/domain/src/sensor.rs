//! Sensors: the four greenhouse readings and their defensive parsing.
//!
//! Readings arrive from the store either as native numbers or as numeric
//! strings. Anything else (missing, `null`, non-numeric text, non-finite
//! values) is an *unknown* reading, represented as `None`. An unknown
//! reading is never replaced with a made-up number.

use serde::{Deserialize, Serialize};

/// One of the four greenhouse sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensor {
    Temperature,
    Humidity,
    SoilMoisture,
    LightIntensity,
}

impl Sensor {
    /// All sensors in display order.
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::Humidity,
        Self::SoilMoisture,
        Self::LightIntensity,
    ];

    /// Human-readable name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::SoilMoisture => "Soil Moisture",
            Self::LightIntensity => "Light Intensity",
        }
    }

    /// Measurement unit.
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "\u{b0}C",
            Self::Humidity | Self::SoilMoisture => "%",
            Self::LightIntensity => "lux",
        }
    }
}

/// One consistent read of the four sensor values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Air temperature in °C.
    pub temperature: Option<f64>,
    /// Relative humidity in %.
    pub humidity: Option<f64>,
    /// Soil moisture in %.
    pub soil_moisture: Option<f64>,
    /// Light intensity in lux.
    pub light_intensity: Option<f64>,
}

impl SensorSnapshot {
    #[must_use]
    pub fn get(&self, sensor: Sensor) -> Option<f64> {
        match sensor {
            Sensor::Temperature => self.temperature,
            Sensor::Humidity => self.humidity,
            Sensor::SoilMoisture => self.soil_moisture,
            Sensor::LightIntensity => self.light_intensity,
        }
    }

    pub fn set(&mut self, sensor: Sensor, value: Option<f64>) {
        match sensor {
            Sensor::Temperature => self.temperature = value,
            Sensor::Humidity => self.humidity = value,
            Sensor::SoilMoisture => self.soil_moisture = value,
            Sensor::LightIntensity => self.light_intensity = value,
        }
    }

    /// Whether no sensor produced a usable reading.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Sensor::ALL.iter().all(|sensor| self.get(*sensor).is_none())
    }

    /// Build a snapshot from a loosely-typed JSON object keyed by the
    /// snake-case sensor names (`temperature`, `soil_moisture`, …).
    ///
    /// Each value goes through [`parse_reading`]; unknown keys are ignored.
    #[must_use]
    pub fn from_lenient(value: &serde_json::Value) -> Self {
        let mut snapshot = Self::default();
        if let Some(object) = value.as_object() {
            for sensor in Sensor::ALL {
                let key = match sensor {
                    Sensor::Temperature => "temperature",
                    Sensor::Humidity => "humidity",
                    Sensor::SoilMoisture => "soil_moisture",
                    Sensor::LightIntensity => "light_intensity",
                };
                snapshot.set(sensor, object.get(key).and_then(parse_reading));
            }
        }
        snapshot
    }
}

/// Coerce a raw store value into a reading.
///
/// Accepts JSON numbers and strings that parse as `f64` (surrounding
/// whitespace allowed). Returns `None` for everything else and for
/// non-finite results.
#[must_use]
pub fn parse_reading(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(number) => number.as_f64(),
        serde_json::Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}
