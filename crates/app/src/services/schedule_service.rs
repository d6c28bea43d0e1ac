//! Schedule service: generate, save, edit and list daily schedules.
//!
//! Generation never fails because of the generator: any error, empty
//! answer or malformed day is replaced by [`DailySchedule::fallback`] and
//! the plan is marked as such. Only invalid caller input is an error.

use greenguard_domain::actuator::Actuator;
use greenguard_domain::error::{
    GenerationError, GreenGuardError, NotFoundError, ValidationError, error_chain,
};
use greenguard_domain::event::{Event, EventPayload};
use greenguard_domain::history::ScheduleInputs;
use greenguard_domain::id::ScheduleId;
use greenguard_domain::schedule::{
    DailySchedule, SavedSchedule, SchedulePlan, ScheduleRequest, ScheduleSource, SlotState,
    validate_key,
};
use greenguard_domain::time::now;

use crate::ports::{EventPublisher, ScheduleGenerator, ScheduleRepository, SensorHistoryRepository};
use crate::services::history_service::HistoryService;

/// Longest plan [`ScheduleService::generate`] produces.
pub const MAX_PLAN_DAYS: u32 = 7;

/// Application service for actuator schedules.
pub struct ScheduleService<H, G, R, P> {
    history: HistoryService<H>,
    generator: G,
    repo: R,
    publisher: P,
}

impl<H, G, R, P> ScheduleService<H, G, R, P>
where
    H: SensorHistoryRepository,
    G: ScheduleGenerator,
    R: ScheduleRepository,
    P: EventPublisher,
{
    /// Create a new service.
    pub fn new(history: H, generator: G, repo: R, publisher: P) -> Self {
        Self {
            history: HistoryService::new(history),
            generator,
            repo,
            publisher,
        }
    }

    /// Produce a plan of `days` days from the last week of history and a
    /// forecast summary. Day 1 comes from the generator; the following
    /// days repeat it.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] unless `1 <= days <= 7`.
    pub async fn generate(
        &self,
        days: u32,
        forecast: &str,
    ) -> Result<SchedulePlan, GreenGuardError> {
        if !(1..=MAX_PLAN_DAYS).contains(&days) {
            return Err(ValidationError::OutOfRange {
                field: "days",
                min: 1,
                max: MAX_PLAN_DAYS,
                actual: days,
            }
            .into());
        }

        let inputs = match self.history.schedule_inputs().await {
            Ok(inputs) => inputs,
            Err(err) => {
                tracing::warn!(error = %err, "history unavailable, using default schedule inputs");
                ScheduleInputs::default()
            }
        };
        let request = ScheduleRequest::new(inputs, forecast);

        let plan = match self.generate_day(request).await {
            Ok(day) => {
                tracing::info!(days, "schedule generated");
                SchedulePlan::repeated(&day, days, ScheduleSource::Generated, inputs, None)
            }
            Err(err) => {
                tracing::warn!(error = %err, days, "schedule generation failed, using fallback");
                SchedulePlan::repeated(
                    &DailySchedule::fallback(),
                    days,
                    ScheduleSource::Fallback,
                    inputs,
                    Some(error_chain(&err)),
                )
            }
        };
        Ok(plan)
    }

    async fn generate_day(&self, request: ScheduleRequest) -> Result<DailySchedule, GreenGuardError> {
        let entries = self.generator.generate(request).await?;
        if entries.is_empty() {
            return Err(GenerationError::Empty.into());
        }
        Ok(DailySchedule::try_from_entries(entries)?)
    }

    /// Insert or replace the schedule for `(owner, day)`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank owner or day label, or a
    /// storage error from the repository.
    pub async fn save(
        &self,
        owner: &str,
        day: &str,
        schedule: DailySchedule,
        source: ScheduleSource,
    ) -> Result<SavedSchedule, GreenGuardError> {
        validate_key(owner, day)?;
        let saved = self
            .repo
            .upsert(SavedSchedule {
                id: ScheduleId::new(),
                owner: owner.trim().to_string(),
                day: day.trim().to_string(),
                schedule,
                source,
                saved_at: now(),
            })
            .await?;
        tracing::info!(owner = %saved.owner, day = %saved.day, source = saved.source.as_str(), "schedule saved");

        let event = Event::new(EventPayload::ScheduleSaved {
            owner: saved.owner.clone(),
            day: saved.day.clone(),
        });
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(error = %err, "failed to publish schedule_saved");
        }
        Ok(saved)
    }

    /// Look up the schedule for `(owner, day)`.
    ///
    /// # Errors
    ///
    /// Returns [`GreenGuardError::NotFound`] when none is saved, a
    /// validation error for blank keys, or a storage error.
    pub async fn get(&self, owner: &str, day: &str) -> Result<SavedSchedule, GreenGuardError> {
        validate_key(owner, day)?;
        self.repo
            .get(owner.trim(), day.trim())
            .await?
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Schedule",
                    id: format!("{}/{}", owner.trim(), day.trim()),
                }
                .into()
            })
    }

    /// All schedules saved by `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyOwner`] or a storage error.
    pub async fn list(&self, owner: &str) -> Result<Vec<SavedSchedule>, GreenGuardError> {
        if owner.trim().is_empty() {
            return Err(ValidationError::EmptyOwner.into());
        }
        self.repo.list_by_owner(owner.trim()).await
    }

    /// Change one actuator in one slot of a saved schedule.
    ///
    /// # Errors
    ///
    /// Returns [`GreenGuardError::NotFound`] when the schedule does not
    /// exist, [`ValidationError::SlotOutOfRange`] for a bad index, or a
    /// storage error.
    pub async fn set_slot(
        &self,
        owner: &str,
        day: &str,
        index: usize,
        actuator: Actuator,
        state: SlotState,
    ) -> Result<SavedSchedule, GreenGuardError> {
        let mut saved = self.get(owner, day).await?;
        saved.schedule.set_slot(index, actuator, state)?;
        self.save(owner, day, saved.schedule, ScheduleSource::Edited)
            .await
    }
}
