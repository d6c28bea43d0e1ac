//! Threshold table for the automatic controller.
//!
//! The table is configuration, not learned state: it is read once at
//! startup (defaults below, optionally overridden from the config file)
//! and never mutated while the controller runs.

use serde::{Deserialize, Serialize};

use crate::error::{GreenGuardError, ValidationError};

/// Numeric boundaries used by the per-actuator rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Fan turns on above this temperature (°C).
    pub temp_high: f64,
    /// Fan turns off below this temperature (°C).
    pub temp_low_fan_off: f64,
    /// Fan turns on above this humidity (%) regardless of temperature.
    pub humidity_high_fan_on: f64,
    /// Lid opens above this humidity (%) while the fan runs.
    pub humidity_high_lid_open: f64,
    /// Lid closes below this humidity (%).
    pub humidity_low_lid_close: f64,
    /// Pump turns on below this soil moisture (%).
    pub soil_moisture_low_pump_on: f64,
    /// Pump turns off above this soil moisture (%).
    pub soil_moisture_high_pump_off: f64,
    /// Bulb turns on below this light intensity (lux).
    pub light_low_bulb_on: f64,
    /// Bulb turns off above this light intensity (lux).
    pub light_high_bulb_off: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_high: 28.0,
            temp_low_fan_off: 24.0,
            humidity_high_fan_on: 75.0,
            humidity_high_lid_open: 70.0,
            humidity_low_lid_close: 50.0,
            soil_moisture_low_pump_on: 35.0,
            soil_moisture_high_pump_off: 55.0,
            light_low_bulb_on: 4000.0,
            light_high_bulb_off: 8000.0,
        }
    }
}

impl ThresholdConfig {
    /// Check that every value is finite and each low bound sits strictly
    /// below its matching high bound.
    ///
    /// # Errors
    ///
    /// Returns [`GreenGuardError::Validation`] naming the offending field(s).
    pub fn validate(&self) -> Result<(), GreenGuardError> {
        let fields = [
            ("temp_high", self.temp_high),
            ("temp_low_fan_off", self.temp_low_fan_off),
            ("humidity_high_fan_on", self.humidity_high_fan_on),
            ("humidity_high_lid_open", self.humidity_high_lid_open),
            ("humidity_low_lid_close", self.humidity_low_lid_close),
            ("soil_moisture_low_pump_on", self.soil_moisture_low_pump_on),
            ("soil_moisture_high_pump_off", self.soil_moisture_high_pump_off),
            ("light_low_bulb_on", self.light_low_bulb_on),
            ("light_high_bulb_off", self.light_high_bulb_off),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ValidationError::ThresholdNotFinite(name).into());
        }

        let pairs = [
            ("temp_low_fan_off", self.temp_low_fan_off, "temp_high", self.temp_high),
            (
                "humidity_low_lid_close",
                self.humidity_low_lid_close,
                "humidity_high_lid_open",
                self.humidity_high_lid_open,
            ),
            (
                "soil_moisture_low_pump_on",
                self.soil_moisture_low_pump_on,
                "soil_moisture_high_pump_off",
                self.soil_moisture_high_pump_off,
            ),
            (
                "light_low_bulb_on",
                self.light_low_bulb_on,
                "light_high_bulb_off",
                self.light_high_bulb_off,
            ),
        ];
        for (low, low_value, high, high_value) in pairs {
            if low_value >= high_value {
                return Err(ValidationError::ThresholdOrder { low, high }.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_ship_documented_defaults() {
        let cfg = ThresholdConfig::default();
        assert!((cfg.temp_high - 28.0).abs() < f64::EPSILON);
        assert!((cfg.temp_low_fan_off - 24.0).abs() < f64::EPSILON);
        assert!((cfg.humidity_high_fan_on - 75.0).abs() < f64::EPSILON);
        assert!((cfg.humidity_high_lid_open - 70.0).abs() < f64::EPSILON);
        assert!((cfg.humidity_low_lid_close - 50.0).abs() < f64::EPSILON);
        assert!((cfg.soil_moisture_low_pump_on - 35.0).abs() < f64::EPSILON);
        assert!((cfg.soil_moisture_high_pump_off - 55.0).abs() < f64::EPSILON);
        assert!((cfg.light_low_bulb_on - 4000.0).abs() < f64::EPSILON);
        assert!((cfg.light_high_bulb_off - 8000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn should_accept_defaults() {
        assert!(ThresholdConfig::default().validate().is_ok());
    }

    #[test]
    fn should_reject_inverted_pump_band() {
        let cfg = ThresholdConfig {
            soil_moisture_low_pump_on: 60.0,
            ..ThresholdConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err,
            GreenGuardError::Validation(ValidationError::ThresholdOrder {
                low: "soil_moisture_low_pump_on",
                ..
            })
        ));
    }

    #[test]
    fn should_reject_non_finite_value() {
        let cfg = ThresholdConfig {
            light_high_bulb_off: f64::INFINITY,
            ..ThresholdConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(GreenGuardError::Validation(
                ValidationError::ThresholdNotFinite("light_high_bulb_off")
            ))
        ));
    }

    #[test]
    fn should_fill_missing_fields_from_defaults() {
        let cfg: ThresholdConfig = serde_json::from_str(r#"{"temp_high": 30.0}"#).unwrap();
        assert!((cfg.temp_high - 30.0).abs() < f64::EPSILON);
        assert!((cfg.temp_low_fan_off - 24.0).abs() < f64::EPSILON);
    }
}
