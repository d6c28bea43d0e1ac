//! Schedule: a day of actuator intentions in 15-minute slots.
//!
//! A [`DailySchedule`] always holds exactly [`SLOTS_PER_DAY`] entries, at
//! `00:00`, `00:15`, … `23:45`, in that order. The constructor enforces this,
//! so anything holding a `DailySchedule` can index slots without checks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::actuator::Actuator;
use crate::error::ValidationError;
use crate::history::ScheduleInputs;
use crate::id::ScheduleId;
use crate::time::Timestamp;

/// Length of a slot in minutes.
pub const SLOT_MINUTES: u32 = 15;

/// Number of slots in a day.
pub const SLOTS_PER_DAY: usize = 96;

/// Crop the greenhouse is configured for.
pub const CROP_TYPE: &str = "Coriander";

/// Planned state of one actuator during one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotState {
    #[serde(rename = "ON")]
    On,
    #[serde(rename = "OFF")]
    Off,
    /// No intention: leave the actuator as it is.
    Idle,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("ON"),
            Self::Off => f.write_str("OFF"),
            Self::Idle => f.write_str("Idle"),
        }
    }
}

/// Start of a slot, formatted `HH:MM` (24-hour).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotTime {
    hour: u8,
    minute: u8,
}

impl SlotTime {
    /// Start time of slot `index`, or `None` past the end of the day.
    #[must_use]
    pub fn for_index(index: usize) -> Option<Self> {
        if index >= SLOTS_PER_DAY {
            return None;
        }
        let minutes = u32::try_from(index).ok()? * SLOT_MINUTES;
        Some(Self {
            hour: u8::try_from(minutes / 60).ok()?,
            minute: u8::try_from(minutes % 60).ok()?,
        })
    }

    #[must_use]
    pub fn hour(self) -> u8 {
        self.hour
    }

    #[must_use]
    pub fn minute(self) -> u8 {
        self.minute
    }

    /// Index of the slot starting at this time, if it is on a slot boundary.
    #[must_use]
    pub fn slot_index(self) -> Option<usize> {
        let minutes = u32::from(self.hour) * 60 + u32::from(self.minute);
        (minutes % SLOT_MINUTES == 0).then(|| (minutes / SLOT_MINUTES) as usize)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for SlotTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTime(s.to_string());
        let (hour, minute) = s.trim().split_once(':').ok_or_else(invalid)?;
        if hour.len() != 2 || minute.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        if hour > 23 || minute > 59 {
            return Err(invalid());
        }
        Ok(Self { hour, minute })
    }
}

impl TryFrom<String> for SlotTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SlotTime> for String {
    fn from(value: SlotTime) -> Self {
        value.to_string()
    }
}

/// One slot of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub time: SlotTime,
    pub fan: SlotState,
    pub pump: SlotState,
    pub lid: SlotState,
    pub bulb: SlotState,
}

impl ScheduleEntry {
    #[must_use]
    pub fn get(&self, actuator: Actuator) -> SlotState {
        match actuator {
            Actuator::Fan => self.fan,
            Actuator::Pump => self.pump,
            Actuator::Lid => self.lid,
            Actuator::Bulb => self.bulb,
        }
    }

    pub fn set(&mut self, actuator: Actuator, state: SlotState) {
        match actuator {
            Actuator::Fan => self.fan = state,
            Actuator::Pump => self.pump = state,
            Actuator::Lid => self.lid = state,
            Actuator::Bulb => self.bulb = state,
        }
    }
}

/// A full, validated day of slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ScheduleEntry>", into = "Vec<ScheduleEntry>")]
pub struct DailySchedule {
    entries: Vec<ScheduleEntry>,
}

impl DailySchedule {
    /// Every slot time of a day, in order.
    pub fn time_slots() -> impl Iterator<Item = SlotTime> {
        (0..SLOTS_PER_DAY).filter_map(SlotTime::for_index)
    }

    /// Build a day from a per-slot function.
    #[must_use]
    pub fn from_fn(mut slot: impl FnMut(SlotTime) -> ScheduleEntry) -> Self {
        Self {
            entries: Self::time_slots().map(&mut slot).collect(),
        }
    }

    /// The conservative day used when generation fails: fan, pump and bulb
    /// OFF, lid Idle, all day.
    #[must_use]
    pub fn fallback() -> Self {
        Self::from_fn(|time| ScheduleEntry {
            time,
            fan: SlotState::Off,
            pump: SlotState::Off,
            lid: SlotState::Idle,
            bulb: SlotState::Off,
        })
    }

    /// Validate raw entries: exactly [`SLOTS_PER_DAY`] of them, each at its
    /// expected slot time.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ScheduleLength`] or
    /// [`ValidationError::SlotTime`] for the first offending entry.
    pub fn try_from_entries(entries: Vec<ScheduleEntry>) -> Result<Self, ValidationError> {
        if entries.len() != SLOTS_PER_DAY {
            return Err(ValidationError::ScheduleLength {
                expected: SLOTS_PER_DAY,
                actual: entries.len(),
            });
        }
        for (index, (entry, expected)) in entries.iter().zip(Self::time_slots()).enumerate() {
            if entry.time != expected {
                return Err(ValidationError::SlotTime {
                    index,
                    expected: expected.to_string(),
                    actual: entry.time.to_string(),
                });
            }
        }
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&ScheduleEntry> {
        self.entries.get(index)
    }

    /// Entry for the slot containing `time`.
    #[must_use]
    pub fn entry_at(&self, time: chrono::NaiveTime) -> &ScheduleEntry {
        use chrono::Timelike;
        let index = (time.hour() * 60 + time.minute()) / SLOT_MINUTES;
        // `index` is always below SLOTS_PER_DAY for a valid NaiveTime.
        &self.entries[index as usize % SLOTS_PER_DAY]
    }

    /// Change one actuator in one slot.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::SlotOutOfRange`] when `index` is not a slot.
    pub fn set_slot(
        &mut self,
        index: usize,
        actuator: Actuator,
        state: SlotState,
    ) -> Result<(), ValidationError> {
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(ValidationError::SlotOutOfRange(index))?;
        entry.set(actuator, state);
        Ok(())
    }
}

impl TryFrom<Vec<ScheduleEntry>> for DailySchedule {
    type Error = ValidationError;

    fn try_from(value: Vec<ScheduleEntry>) -> Result<Self, Self::Error> {
        Self::try_from_entries(value)
    }
}

impl From<DailySchedule> for Vec<ScheduleEntry> {
    fn from(value: DailySchedule) -> Self {
        value.entries
    }
}

/// Structured request sent to a schedule generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub crop_type: String,
    #[serde(flatten)]
    pub inputs: ScheduleInputs,
    /// Free-text forecast for the coming days.
    pub weather_forecast_summary: String,
}

impl ScheduleRequest {
    #[must_use]
    pub fn new(inputs: ScheduleInputs, weather_forecast_summary: impl Into<String>) -> Self {
        Self {
            crop_type: CROP_TYPE.to_string(),
            inputs,
            weather_forecast_summary: weather_forecast_summary.into(),
        }
    }
}

/// Where a schedule's content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSource {
    Generated,
    Fallback,
    Edited,
}

impl ScheduleSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Fallback => "fallback",
            Self::Edited => "edited",
        }
    }
}

impl FromStr for ScheduleSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generated" => Ok(Self::Generated),
            "fallback" => Ok(Self::Fallback),
            "edited" => Ok(Self::Edited),
            other => Err(ValidationError::UnknownScheduleSource(other.to_string())),
        }
    }
}

/// Label of the `n`th planned day (1-based), e.g. `day-1`.
#[must_use]
pub fn day_label(n: u32) -> String {
    format!("day-{n}")
}

/// One labelled day of a generated plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedDay {
    pub day: String,
    pub schedule: DailySchedule,
}

/// Result of a generation request covering one or more days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulePlan {
    pub source: ScheduleSource,
    pub inputs: ScheduleInputs,
    /// Why the fallback was used, when it was.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub days: Vec<PlannedDay>,
}

impl SchedulePlan {
    /// Repeat `first` for `days` days, labelled `day-1` … `day-N`.
    #[must_use]
    pub fn repeated(
        first: &DailySchedule,
        days: u32,
        source: ScheduleSource,
        inputs: ScheduleInputs,
        fallback_reason: Option<String>,
    ) -> Self {
        Self {
            source,
            inputs,
            fallback_reason,
            days: (1..=days)
                .map(|n| PlannedDay {
                    day: day_label(n),
                    schedule: first.clone(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == ScheduleSource::Fallback
    }
}

/// A schedule persisted for one owner and day label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSchedule {
    pub id: ScheduleId,
    pub owner: String,
    pub day: String,
    pub schedule: DailySchedule,
    pub source: ScheduleSource,
    pub saved_at: Timestamp,
}

/// Check an owner / day-label pair before it reaches storage.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyOwner`] or [`ValidationError::EmptyDayLabel`].
pub fn validate_key(owner: &str, day: &str) -> Result<(), ValidationError> {
    if owner.trim().is_empty() {
        return Err(ValidationError::EmptyOwner);
    }
    if day.trim().is_empty() {
        return Err(ValidationError::EmptyDayLabel);
    }
    Ok(())
}
