//! History summary handler.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;

use greenguard_app::ports::{
    EventPublisher, GreenhouseStore, ScheduleGenerator, ScheduleRepository,
    SensorHistoryRepository,
};
use greenguard_domain::history::DailySummary;

use crate::error::ApiError;
use crate::state::AppState;

/// Default window when `days` is omitted.
const DEFAULT_DAYS: u32 = 7;

/// Query parameters for the history endpoint.
#[derive(Deserialize)]
pub struct HistoryQuery {
    /// Number of days to summarise, 1 to 30. Defaults to 7.
    pub days: Option<u32>,
}

/// `GET /api/history?days=N`
pub async fn daily<S, P, H, G, R>(
    State(state): State<AppState<S, P, H, G, R>>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<DailySummary>>, ApiError>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    let days = params.days.unwrap_or(DEFAULT_DAYS);
    Ok(Json(state.history.daily_summaries(days).await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::{TestApp, send};
    use axum::http::{Method, StatusCode};
    use greenguard_domain::history::HistoryPoint;
    use greenguard_domain::sensor::SensorSnapshot;
    use greenguard_domain::time::now;

    #[tokio::test]
    async fn should_summarise_recorded_points() {
        let app = TestApp::new();
        for temperature in [20.0, 24.0] {
            app.history_repo.seed(HistoryPoint::new(
                now(),
                SensorSnapshot {
                    temperature: Some(temperature),
                    ..SensorSnapshot::default()
                },
            ));
        }

        let (status, body) = send(&app.router(), Method::GET, "/api/history?days=1", None).await;

        assert_eq!(status, StatusCode::OK);
        let days = body.as_array().unwrap();
        assert_eq!(days.len(), 1);
        assert_eq!(days[0]["sensors"]["temperature"], 22.0);
        assert_eq!(days[0]["samples"], 2);
    }

    #[tokio::test]
    async fn should_reject_too_long_window() {
        let app = TestApp::new();
        let (status, body) = send(&app.router(), Method::GET, "/api/history?days=31", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "days must be between 1 and 30, got 31");
    }
}
