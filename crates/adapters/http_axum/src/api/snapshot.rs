//! Snapshot and sensor ingestion handlers.

use axum::Json;
use axum::extract::State;

use greenguard_app::ports::{
    EventPublisher, GreenhouseStore, ScheduleGenerator, ScheduleRepository,
    SensorHistoryRepository,
};
use greenguard_domain::sensor::SensorSnapshot;
use greenguard_domain::snapshot::Snapshot;

use crate::error::ApiError;
use crate::state::AppState;

/// `GET /api/snapshot`
pub async fn get<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
) -> Result<Json<Snapshot>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    Ok(Json(state.greenhouse.snapshot().await?))
}

/// `PUT /api/sensors`
///
/// Accepts an object keyed by `temperature`, `humidity`, `soil_moisture` and
/// `light_intensity`. Values may be numbers or numeric strings; anything
/// else is ignored. At least one usable reading is required.
pub async fn ingest<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<Snapshot>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let readings = SensorSnapshot::from_lenient(&body);
    Ok(Json(state.greenhouse.ingest_readings(readings).await?))
}
