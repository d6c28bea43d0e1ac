//! Deterministic rule-based schedule generator.
//!
//! Stands in for the remote structured-text generator. The day it builds
//! follows from the request's averages and the threshold table:
//!
//! | Actuator | Planned ON | Otherwise |
//! |----------|------------|-----------|
//! | Pump | 06:00 and 18:00, for one slot per 5 points of daily soil drop (1 to 4 slots) | OFF |
//! | Fan | 11:00–16:00 when the average temperature or humidity is within reach of its threshold | OFF |
//! | Lid | 10:00–16:00 when the average humidity exceeds the lid threshold | Idle |
//! | Bulb | 05:00–07:00 and 17:00–20:00, plus 08:00–16:00 when the forecast is overcast | OFF |

use std::future::Future;
use std::ops::Range;

use greenguard_app::ports::ScheduleGenerator;
use greenguard_domain::error::GreenGuardError;
use greenguard_domain::schedule::{
    DailySchedule, ScheduleEntry, ScheduleRequest, SlotState, SlotTime,
};
use greenguard_domain::thresholds::ThresholdConfig;

/// How close (°C or %) an average may get to a fan threshold before the
/// afternoon fan block is planned.
const FAN_MARGIN: f64 = 4.0;

/// Soil drop (percentage points per day) covered by one pump slot.
const DROP_PER_PUMP_SLOT: f64 = 5.0;

const MAX_PUMP_SLOTS: u32 = 4;

const OVERCAST_WORDS: [&str; 4] = ["cloud", "overcast", "rain", "storm"];

/// Builds a full day from the request without any IO.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedScheduleGenerator {
    thresholds: ThresholdConfig,
}

impl RuleBasedScheduleGenerator {
    #[must_use]
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    /// The day planned for `request`.
    #[must_use]
    pub fn plan(&self, request: &ScheduleRequest) -> DailySchedule {
        let inputs = &request.inputs;
        let pump_slots = pump_slots(inputs.average_soil_moisture_drop);
        let fan_needed = inputs.average_temperature + FAN_MARGIN > self.thresholds.temp_high
            || inputs.average_humidity + FAN_MARGIN > self.thresholds.humidity_high_fan_on;
        let lid_needed = inputs.average_humidity > self.thresholds.humidity_high_lid_open;
        let overcast = is_overcast(&request.weather_forecast_summary);

        DailySchedule::from_fn(|time| {
            let minutes = minute_of_day(time);
            let pump = [6 * 60, 18 * 60]
                .into_iter()
                .any(|start| (start..start + pump_slots * 15).contains(&minutes));
            let fan = fan_needed && hours(11, 16).contains(&minutes);
            let lid = lid_needed && hours(10, 16).contains(&minutes);
            let bulb = hours(5, 7).contains(&minutes)
                || hours(17, 20).contains(&minutes)
                || (overcast && hours(8, 16).contains(&minutes));

            ScheduleEntry {
                time,
                fan: on_or(fan, SlotState::Off),
                pump: on_or(pump, SlotState::Off),
                lid: on_or(lid, SlotState::Idle),
                bulb: on_or(bulb, SlotState::Off),
            }
        })
    }
}

fn minute_of_day(time: SlotTime) -> u32 {
    u32::from(time.hour()) * 60 + u32::from(time.minute())
}

fn hours(from: u32, to: u32) -> Range<u32> {
    from * 60..to * 60
}

fn on_or(on: bool, otherwise: SlotState) -> SlotState {
    if on { SlotState::On } else { otherwise }
}

fn pump_slots(drop: f64) -> u32 {
    let slots = (drop / DROP_PER_PUMP_SLOT).ceil();
    if slots.is_finite() && slots > 1.0 {
        // clamped below MAX_PUMP_SLOTS, the cast cannot truncate
        slots.min(f64::from(MAX_PUMP_SLOTS)) as u32
    } else {
        1
    }
}

fn is_overcast(forecast: &str) -> bool {
    let forecast = forecast.to_lowercase();
    OVERCAST_WORDS.iter().any(|word| forecast.contains(word))
}

impl ScheduleGenerator for RuleBasedScheduleGenerator {
    fn generate(
        &self,
        request: ScheduleRequest,
    ) -> impl Future<Output = Result<Vec<ScheduleEntry>, GreenGuardError>> + Send {
        let entries: Vec<ScheduleEntry> = self.plan(&request).into();
        tracing::debug!(
            crop = %request.crop_type,
            forecast = %request.weather_forecast_summary,
            "rule-based schedule generated"
        );
        async { Ok(entries) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenguard_domain::actuator::Actuator;
    use greenguard_domain::history::ScheduleInputs;
    use greenguard_domain::schedule::SLOTS_PER_DAY;

    fn request(temperature: f64, humidity: f64, drop: f64, forecast: &str) -> ScheduleRequest {
        ScheduleRequest::new(
            ScheduleInputs {
                average_temperature: temperature,
                average_humidity: humidity,
                average_soil_moisture_drop: drop,
            },
            forecast,
        )
    }

    fn on_times(schedule: &DailySchedule, actuator: Actuator) -> Vec<String> {
        schedule
            .entries()
            .iter()
            .filter(|entry| entry.get(actuator) == SlotState::On)
            .map(|entry| entry.time.to_string())
            .collect()
    }

    #[tokio::test]
    async fn should_generate_full_valid_day() {
        let generator = RuleBasedScheduleGenerator::default();
        let entries = generator
            .generate(request(25.0, 60.0, 10.0, "sunny"))
            .await
            .unwrap();
        assert_eq!(entries.len(), SLOTS_PER_DAY);
        assert!(DailySchedule::try_from_entries(entries).is_ok());
    }

    #[test]
    fn should_scale_watering_with_soil_drop() {
        let generator = RuleBasedScheduleGenerator::default();

        let light = generator.plan(&request(25.0, 60.0, 2.0, "sunny"));
        assert_eq!(on_times(&light, Actuator::Pump), ["06:00", "18:00"]);

        let heavy = generator.plan(&request(25.0, 60.0, 12.0, "sunny"));
        assert_eq!(
            on_times(&heavy, Actuator::Pump),
            ["06:00", "06:15", "06:30", "18:00", "18:15", "18:30"]
        );

        let extreme = generator.plan(&request(25.0, 60.0, 80.0, "sunny"));
        assert_eq!(on_times(&extreme, Actuator::Pump).len(), 8);
    }

    #[test]
    fn should_plan_afternoon_fan_only_when_warm() {
        let generator = RuleBasedScheduleGenerator::default();

        let mild = generator.plan(&request(20.0, 50.0, 10.0, "sunny"));
        assert!(on_times(&mild, Actuator::Fan).is_empty());

        let warm = generator.plan(&request(26.0, 50.0, 10.0, "sunny"));
        let fan = on_times(&warm, Actuator::Fan);
        assert_eq!(fan.first().map(String::as_str), Some("11:00"));
        assert_eq!(fan.last().map(String::as_str), Some("15:45"));
    }

    #[test]
    fn should_leave_lid_idle_unless_humid() {
        let generator = RuleBasedScheduleGenerator::default();

        let dry = generator.plan(&request(25.0, 55.0, 10.0, "sunny"));
        assert!(dry.entries().iter().all(|entry| entry.lid == SlotState::Idle));

        let humid = generator.plan(&request(25.0, 72.0, 10.0, "sunny"));
        assert_eq!(on_times(&humid, Actuator::Lid).len(), 24);
    }

    #[test]
    fn should_extend_lighting_on_overcast_forecast() {
        let generator = RuleBasedScheduleGenerator::default();

        let sunny = on_times(&generator.plan(&request(25.0, 60.0, 10.0, "Sunny")), Actuator::Bulb);
        let cloudy = on_times(
            &generator.plan(&request(25.0, 60.0, 10.0, "Mostly CLOUDY with showers")),
            Actuator::Bulb,
        );

        assert_eq!(sunny.len(), 20);
        assert_eq!(cloudy.len(), 52);
        assert!(!sunny.contains(&"12:00".to_string()));
        assert!(cloudy.contains(&"12:00".to_string()));
    }

    #[test]
    fn should_honour_custom_thresholds() {
        let generator = RuleBasedScheduleGenerator::new(ThresholdConfig {
            temp_high: 20.0,
            ..ThresholdConfig::default()
        });
        let day = generator.plan(&request(18.0, 40.0, 10.0, "sunny"));
        assert!(!on_times(&day, Actuator::Fan).is_empty());
    }
}
