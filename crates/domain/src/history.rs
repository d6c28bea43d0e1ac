//! Sensor history: recorded points, per-day aggregation and the averages
//! fed to the schedule generator.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::HistoryPointId;
use crate::sensor::{Sensor, SensorSnapshot};
use crate::time::{Timestamp, utc_day};

/// A recorded set of readings at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub id: HistoryPointId,
    pub recorded_at: Timestamp,
    pub sensors: SensorSnapshot,
}

impl HistoryPoint {
    #[must_use]
    pub fn new(recorded_at: Timestamp, sensors: SensorSnapshot) -> Self {
        Self {
            id: HistoryPointId::new(),
            recorded_at,
            sensors,
        }
    }
}

/// Mean readings for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Each field is the mean over the day's points that carried it.
    pub sensors: SensorSnapshot,
    /// Number of points recorded that day.
    pub samples: usize,
}

#[derive(Default)]
struct Accumulator {
    sums: [f64; 4],
    counts: [u32; 4],
    samples: usize,
}

/// Group points by UTC day and average every reading, oldest day first.
#[must_use]
pub fn summarize_daily(points: &[HistoryPoint]) -> Vec<DailySummary> {
    let mut days: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for point in points {
        let acc = days.entry(utc_day(point.recorded_at)).or_default();
        acc.samples += 1;
        for (index, sensor) in Sensor::ALL.into_iter().enumerate() {
            if let Some(value) = point.sensors.get(sensor) {
                acc.sums[index] += value;
                acc.counts[index] += 1;
            }
        }
    }

    days.into_iter()
        .map(|(date, acc)| {
            let mut sensors = SensorSnapshot::default();
            for (index, sensor) in Sensor::ALL.into_iter().enumerate() {
                if acc.counts[index] > 0 {
                    sensors.set(sensor, Some(acc.sums[index] / f64::from(acc.counts[index])));
                }
            }
            DailySummary {
                date,
                sensors,
                samples: acc.samples,
            }
        })
        .collect()
}

/// Aggregates passed to the schedule generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleInputs {
    pub average_temperature: f64,
    pub average_humidity: f64,
    /// Mean positive day-over-day drop in soil moisture, in percentage points.
    pub average_soil_moisture_drop: f64,
}

impl ScheduleInputs {
    pub const DEFAULT_TEMPERATURE: f64 = 25.0;
    pub const DEFAULT_HUMIDITY: f64 = 60.0;
    pub const DEFAULT_SOIL_MOISTURE_DROP: f64 = 10.0;

    /// Derive the inputs from daily readings, oldest first.
    ///
    /// Missing readings are skipped, not zero-filled. A value with no data
    /// at all falls back to its default. Soil drop needs at least two days
    /// carrying soil moisture; a rise counts as a drop of zero.
    #[must_use]
    pub fn from_daily(days: &[SensorSnapshot]) -> Self {
        let average_temperature =
            mean(days.iter().filter_map(|day| day.temperature)).unwrap_or(Self::DEFAULT_TEMPERATURE);
        let average_humidity =
            mean(days.iter().filter_map(|day| day.humidity)).unwrap_or(Self::DEFAULT_HUMIDITY);

        let soil: Vec<f64> = days.iter().filter_map(|day| day.soil_moisture).collect();
        let average_soil_moisture_drop = mean(
            soil.windows(2)
                .map(|pair| (pair[0] - pair[1]).max(0.0)),
        )
        .unwrap_or(Self::DEFAULT_SOIL_MOISTURE_DROP);

        Self {
            average_temperature: round1(average_temperature),
            average_humidity: round1(average_humidity),
            average_soil_moisture_drop: round1(average_soil_moisture_drop),
        }
    }
}

impl Default for ScheduleInputs {
    fn default() -> Self {
        Self {
            average_temperature: Self::DEFAULT_TEMPERATURE,
            average_humidity: Self::DEFAULT_HUMIDITY,
            average_soil_moisture_drop: Self::DEFAULT_SOIL_MOISTURE_DROP,
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_u32), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / f64::from(count))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn point(day: u32, hour: u32, sensors: SensorSnapshot) -> HistoryPoint {
        HistoryPoint::new(
            Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap(),
            sensors,
        )
    }

    fn reading(temperature: f64, soil_moisture: Option<f64>) -> SensorSnapshot {
        SensorSnapshot {
            temperature: Some(temperature),
            soil_moisture,
            ..SensorSnapshot::default()
        }
    }

    #[test]
    fn should_group_points_by_utc_day_in_order() {
        let points = vec![
            point(2, 8, reading(20.0, None)),
            point(1, 8, reading(10.0, None)),
            point(1, 20, reading(14.0, None)),
        ];

        let days = summarize_daily(&points);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(days[0].samples, 2);
        assert!(approx(days[0].sensors.temperature.unwrap(), 12.0));
        assert!(approx(days[1].sensors.temperature.unwrap(), 20.0));
    }

    #[test]
    fn should_average_each_reading_over_points_that_carry_it() {
        let points = vec![
            point(1, 8, reading(10.0, Some(40.0))),
            point(1, 9, reading(20.0, None)),
        ];
        let days = summarize_daily(&points);
        assert!(approx(days[0].sensors.soil_moisture.unwrap(), 40.0));
        assert_eq!(days[0].sensors.humidity, None);
    }

    #[test]
    fn should_return_nothing_for_no_points() {
        assert!(summarize_daily(&[]).is_empty());
    }

    #[test]
    fn should_use_defaults_without_history() {
        assert_eq!(ScheduleInputs::from_daily(&[]), ScheduleInputs::default());
    }

    #[test]
    fn should_default_soil_drop_with_single_day() {
        let inputs = ScheduleInputs::from_daily(&[reading(22.0, Some(40.0))]);
        assert!(approx(inputs.average_temperature, 22.0));
        assert!(approx(inputs.average_soil_moisture_drop, 10.0));
    }

    #[test]
    fn should_average_positive_soil_drops_only() {
        // Drops: 50→44 = 6, 44→47 = rise (0), 47→40 = 7 → (6 + 0 + 7) / 3
        let days = [
            reading(20.0, Some(50.0)),
            reading(20.0, Some(44.0)),
            reading(20.0, Some(47.0)),
            reading(20.0, Some(40.0)),
        ];
        let inputs = ScheduleInputs::from_daily(&days);
        assert!(approx(inputs.average_soil_moisture_drop, 4.3));
    }

    #[test]
    fn should_round_to_one_decimal() {
        let days = [
            SensorSnapshot {
                temperature: Some(21.04),
                humidity: Some(55.56),
                ..SensorSnapshot::default()
            },
            SensorSnapshot {
                temperature: Some(21.0),
                humidity: Some(55.56),
                ..SensorSnapshot::default()
            },
        ];
        let inputs = ScheduleInputs::from_daily(&days);
        assert!(approx(inputs.average_temperature, 21.0));
        assert!(approx(inputs.average_humidity, 55.6));
    }

    #[test]
    fn should_skip_days_missing_a_reading() {
        let days = [
            SensorSnapshot {
                humidity: Some(70.0),
                ..SensorSnapshot::default()
            },
            reading(30.0, None),
        ];
        let inputs = ScheduleInputs::from_daily(&days);
        assert!(approx(inputs.average_temperature, 30.0));
        assert!(approx(inputs.average_humidity, 70.0));
    }
}
