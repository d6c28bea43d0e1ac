//! Simulated sensor feed.
//!
//! Produces a day/night cycle of readings that responds to the actuators:
//! the fan cools and dries the air, the open lid vents humidity, the pump
//! raises soil moisture and the bulb adds light. Output is a pure function
//! of the tick count and the actuator states seen so far, so runs are
//! reproducible.

use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

use greenguard_app::ports::{EventPublisher, GreenhouseStore};
use greenguard_app::services::greenhouse_service::GreenhouseService;
use greenguard_domain::actuator::{ActuatorState, ActuatorStates};
use greenguard_domain::sensor::SensorSnapshot;

const BASE_TEMPERATURE: f64 = 24.0;
const TEMPERATURE_SWING: f64 = 6.0;
const BASE_HUMIDITY: f64 = 65.0;
const HUMIDITY_SWING: f64 = 15.0;
const DAYLIGHT_PEAK: f64 = 12_000.0;
const BULB_LUX: f64 = 3_000.0;
const INITIAL_SOIL_MOISTURE: f64 = 45.0;
const PUMP_GAIN: f64 = 4.0;

/// Deterministic greenhouse sensor simulator.
#[derive(Debug, Clone)]
pub struct SensorSimulator {
    tick: u64,
    ticks_per_day: u64,
    soil_moisture: f64,
}

impl SensorSimulator {
    /// A simulator whose day lasts `ticks_per_day` readings. The first
    /// reading is taken at midnight.
    #[must_use]
    pub fn new(ticks_per_day: u64) -> Self {
        Self {
            tick: 0,
            ticks_per_day: ticks_per_day.max(1),
            soil_moisture: INITIAL_SOIL_MOISTURE,
        }
    }

    /// Advance one tick and return the readings under `actuators`.
    pub fn next_readings(&mut self, actuators: &ActuatorStates) -> SensorSnapshot {
        let on = |state: Option<ActuatorState>| state.is_some_and(ActuatorState::is_on);
        let daylight = self.daylight();
        self.tick = self.tick.wrapping_add(1);

        let mut temperature = BASE_TEMPERATURE + TEMPERATURE_SWING * daylight;
        let mut humidity = BASE_HUMIDITY - HUMIDITY_SWING * daylight;
        if on(actuators.fan) {
            temperature -= 3.0;
            humidity -= 8.0;
        }
        if on(actuators.lid) {
            temperature -= 1.0;
            humidity -= 5.0;
        }
        if on(actuators.pump) {
            humidity += 5.0;
        }

        let evaporation = 0.3 + 0.02 * (temperature - 20.0).max(0.0);
        let irrigation = if on(actuators.pump) { PUMP_GAIN } else { 0.0 };
        self.soil_moisture = (self.soil_moisture - evaporation + irrigation).clamp(0.0, 100.0);

        let mut light = (DAYLIGHT_PEAK * daylight).max(0.0);
        if on(actuators.bulb) {
            light += BULB_LUX;
        }

        SensorSnapshot {
            temperature: Some(round1(temperature)),
            humidity: Some(round1(humidity.clamp(0.0, 100.0))),
            soil_moisture: Some(round1(self.soil_moisture)),
            light_intensity: Some(round1(light)),
        }
    }

    /// -1 at midnight, +1 at noon.
    #[allow(clippy::cast_precision_loss)]
    fn daylight(&self) -> f64 {
        let phase = (self.tick % self.ticks_per_day) as f64 / self.ticks_per_day as f64;
        (TAU * (phase - 0.25)).sin()
    }

    /// Feed one reading per `interval` into the service until the task is
    /// aborted. Failures are logged and the next tick tries again.
    pub async fn run<S, P>(mut self, service: Arc<GreenhouseService<S, P>>, interval: Duration)
    where
        S: GreenhouseStore,
        P: EventPublisher,
    {
        tracing::info!(?interval, ticks_per_day = self.ticks_per_day, "sensor simulator started");
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let actuators = match service.snapshot().await {
                Ok(snapshot) => snapshot.actuators,
                Err(err) => {
                    tracing::warn!(error = %err, "simulator could not read actuators");
                    ActuatorStates::default()
                }
            };
            let readings = self.next_readings(&actuators);
            if let Err(err) = service.ingest_readings(readings).await {
                tracing::warn!(error = %err, "simulated readings rejected");
            }
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
