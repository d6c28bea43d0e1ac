//! Schedule handlers: generation, persistence and slot edits.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use greenguard_app::ports::{
    EventPublisher, GreenhouseStore, ScheduleGenerator, ScheduleRepository,
    SensorHistoryRepository,
};
use greenguard_domain::actuator::Actuator;
use greenguard_domain::schedule::{
    DailySchedule, SavedSchedule, ScheduleEntry, SchedulePlan, ScheduleSource, SlotState,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for plan generation.
#[derive(Deserialize)]
pub struct GenerateRequest {
    /// Days to plan, 1 to 7.
    #[serde(default = "one_day")]
    pub days: u32,
    /// Free-text weather forecast passed to the generator.
    #[serde(default)]
    pub forecast: String,
    /// When set, every planned day is saved for this owner.
    pub owner: Option<String>,
}

fn one_day() -> u32 {
    1
}

/// Request body for saving one day.
#[derive(Deserialize)]
pub struct SaveRequest {
    /// Raw entries; validated into a full day before saving.
    pub entries: Vec<ScheduleEntry>,
    /// Defaults to `edited`.
    pub source: Option<ScheduleSource>,
}

/// Request body for editing one slot.
#[derive(Deserialize)]
pub struct SetSlotRequest {
    pub actuator: Actuator,
    pub state: SlotState,
}

/// `POST /api/schedules/generate`
pub async fn generate<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Json(body): Json<GenerateRequest>,
) -> Result<Json<SchedulePlan>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let plan = state.schedules.generate(body.days, &body.forecast).await?;
    if let Some(owner) = body.owner.as_deref() {
        for day in &plan.days {
            state
                .schedules
                .save(owner, &day.day, day.schedule.clone(), plan.source)
                .await?;
        }
    }
    Ok(Json(plan))
}

/// `GET /api/schedules/{owner}`
pub async fn list<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<SavedSchedule>>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    Ok(Json(state.schedules.list(&owner).await?))
}

/// `GET /api/schedules/{owner}/{day}`
pub async fn get<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Path((owner, day)): Path<(String, String)>,
) -> Result<Json<SavedSchedule>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    Ok(Json(state.schedules.get(&owner, &day).await?))
}

/// `PUT /api/schedules/{owner}/{day}`
pub async fn save<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Path((owner, day)): Path<(String, String)>,
    Json(body): Json<SaveRequest>,
) -> Result<Json<SavedSchedule>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let schedule = DailySchedule::try_from_entries(body.entries)?;
    let source = body.source.unwrap_or(ScheduleSource::Edited);
    Ok(Json(
        state.schedules.save(&owner, &day, schedule, source).await?,
    ))
}

/// `PATCH /api/schedules/{owner}/{day}/slots/{index}`
pub async fn set_slot<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Path((owner, day, index)): Path<(String, String, usize)>,
    Json(body): Json<SetSlotRequest>,
) -> Result<Json<SavedSchedule>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let saved = state
        .schedules
        .set_slot(&owner, &day, index, body.actuator, body.state)
        .await?;
    Ok(Json(saved))
}
