//! Threshold controller rules.
//!
//! Every decision is a pure function of the latest sensor readings and,
//! for the hysteresis actuators, that actuator's last known state. The
//! controller never keeps memory of its own between passes: "previous
//! state" is whatever the snapshot says.
//!
//! All comparisons are strict. A reading sitting exactly on a threshold
//! falls into the dead band.
//!
//! | Actuator | ON when | OFF when | Dead band | Unknown reading |
//! |----------|---------|----------|-----------|-----------------|
//! | Fan  | humidity > 75, or temperature > 28 | temperature < 24 | OFF | OFF |
//! | Lid  | humidity > 70 and fan ON | humidity < 50 or fan OFF | OFF | OFF |
//! | Pump | soil < 35 | soil > 55 | current | OFF |
//! | Bulb | light < 4000 | light > 8000 | current | OFF |

use serde::{Deserialize, Serialize};

use crate::actuator::{Actuator, ActuatorState, ActuatorStates};
use crate::sensor::SensorSnapshot;
use crate::thresholds::ThresholdConfig;

/// Fan rule. Humidity above the fan threshold wins over temperature.
#[must_use]
pub fn decide_fan(cfg: &ThresholdConfig, sensors: &SensorSnapshot) -> ActuatorState {
    if sensors
        .humidity
        .is_some_and(|humidity| humidity > cfg.humidity_high_fan_on)
    {
        return ActuatorState::On;
    }
    match sensors.temperature {
        Some(temperature) if temperature > cfg.temp_high => ActuatorState::On,
        Some(temperature) if temperature < cfg.temp_low_fan_off => ActuatorState::Off,
        // Dead band resets to OFF rather than holding the previous state.
        _ => ActuatorState::Off,
    }
}

/// Lid rule. `fan` must be the fan state computed in the same pass.
#[must_use]
pub fn decide_lid(
    cfg: &ThresholdConfig,
    humidity: Option<f64>,
    fan: ActuatorState,
) -> ActuatorState {
    let Some(humidity) = humidity else {
        return ActuatorState::Off;
    };
    if humidity > cfg.humidity_high_lid_open && fan.is_on() {
        ActuatorState::On
    } else if humidity < cfg.humidity_low_lid_close || !fan.is_on() {
        ActuatorState::Off
    } else {
        // Between the lid thresholds with the fan running: stay closed.
        ActuatorState::Off
    }
}

/// Pump rule with hysteresis on soil moisture.
#[must_use]
pub fn decide_pump(
    cfg: &ThresholdConfig,
    soil_moisture: Option<f64>,
    current: ActuatorState,
) -> ActuatorState {
    hysteresis(
        soil_moisture,
        cfg.soil_moisture_low_pump_on,
        cfg.soil_moisture_high_pump_off,
        current,
    )
}

/// Bulb rule with hysteresis on light intensity.
#[must_use]
pub fn decide_bulb(
    cfg: &ThresholdConfig,
    light_intensity: Option<f64>,
    current: ActuatorState,
) -> ActuatorState {
    hysteresis(
        light_intensity,
        cfg.light_low_bulb_on,
        cfg.light_high_bulb_off,
        current,
    )
}

/// ON below `on_below`, OFF above `off_above`, `current` in between.
/// An unknown reading switches the output off.
fn hysteresis(
    value: Option<f64>,
    on_below: f64,
    off_above: f64,
    current: ActuatorState,
) -> ActuatorState {
    match value {
        None => ActuatorState::Off,
        Some(value) if value < on_below => ActuatorState::On,
        Some(value) if value > off_above => ActuatorState::Off,
        Some(_) => current,
    }
}

/// Desired state of every actuator after one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredStates {
    pub fan: ActuatorState,
    pub lid: ActuatorState,
    pub pump: ActuatorState,
    pub bulb: ActuatorState,
}

impl DesiredStates {
    #[must_use]
    pub fn get(&self, actuator: Actuator) -> ActuatorState {
        match actuator {
            Actuator::Fan => self.fan,
            Actuator::Lid => self.lid,
            Actuator::Pump => self.pump,
            Actuator::Bulb => self.bulb,
        }
    }
}

/// A single write the controller wants issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub actuator: Actuator,
    pub state: ActuatorState,
}

/// Outcome of one controller pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPlan {
    pub desired: DesiredStates,
    /// Only actuators whose desired state differs from the last known one,
    /// in evaluation order.
    pub commands: Vec<Command>,
}

impl ControlPlan {
    /// The command for `actuator`, if one is needed.
    #[must_use]
    pub fn command_for(&self, actuator: Actuator) -> Option<ActuatorState> {
        self.commands
            .iter()
            .find(|command| command.actuator == actuator)
            .map(|command| command.state)
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Evaluate all four rules (Fan first, Lid reads Fan's new state) and
/// diff the result against the last known states.
///
/// Unknown current states count as OFF, both as hysteresis input and for
/// the diff.
#[must_use]
pub fn plan(
    cfg: &ThresholdConfig,
    sensors: &SensorSnapshot,
    current: &ActuatorStates,
) -> ControlPlan {
    let fan = decide_fan(cfg, sensors);
    let lid = decide_lid(cfg, sensors.humidity, fan);
    let pump = decide_pump(cfg, sensors.soil_moisture, current.effective(Actuator::Pump));
    let bulb = decide_bulb(
        cfg,
        sensors.light_intensity,
        current.effective(Actuator::Bulb),
    );
    let desired = DesiredStates {
        fan,
        lid,
        pump,
        bulb,
    };

    let commands = Actuator::ALL
        .into_iter()
        .filter(|actuator| desired.get(*actuator) != current.effective(*actuator))
        .map(|actuator| Command {
            actuator,
            state: desired.get(actuator),
        })
        .collect();

    ControlPlan { desired, commands }
}
