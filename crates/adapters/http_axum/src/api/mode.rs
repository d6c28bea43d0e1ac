//! Control mode handlers.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use greenguard_app::ports::{
    EventPublisher, GreenhouseStore, ScheduleGenerator, ScheduleRepository,
    SensorHistoryRepository,
};
use greenguard_domain::mode::ControlMode;
use greenguard_domain::snapshot::Snapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for changing the control mode.
#[derive(Deserialize)]
pub struct SetModeRequest {
    pub mode: ControlMode,
}

/// `PUT /api/mode`
pub async fn set<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Json(body): Json<SetModeRequest>,
) -> Result<Json<Snapshot>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    Ok(Json(state.greenhouse.set_mode(body.mode).await?))
}

/// `POST /api/mode/toggle`
pub async fn toggle<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
) -> Result<Json<Snapshot>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    Ok(Json(state.greenhouse.toggle_mode().await?))
}
