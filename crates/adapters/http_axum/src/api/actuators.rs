//! Actuator command handlers.

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;

use greenguard_app::ports::{
    EventPublisher, GreenhouseStore, ScheduleGenerator, ScheduleRepository,
    SensorHistoryRepository,
};
use greenguard_domain::actuator::{Actuator, ActuatorState};
use greenguard_domain::event::CommandOrigin;
use greenguard_domain::snapshot::Snapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for switching an actuator.
#[derive(Deserialize)]
pub struct SetActuatorRequest {
    pub state: ActuatorState,
}

/// `PUT /api/actuators/{actuator}`
pub async fn set<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Path(actuator): Path<String>,
    Json(body): Json<SetActuatorRequest>,
) -> Result<Json<Snapshot>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let actuator: Actuator = actuator.parse()?;
    let snapshot = state
        .greenhouse
        .set_actuator(actuator, body.state, CommandOrigin::Manual)
        .await?;
    Ok(Json(snapshot))
}

/// `POST /api/actuators/{actuator}/toggle`
pub async fn toggle<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Path(actuator): Path<String>,
) -> Result<Json<Snapshot>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let actuator: Actuator = actuator.parse()?;
    Ok(Json(state.greenhouse.toggle_actuator(actuator).await?))
}
