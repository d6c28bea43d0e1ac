//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod actuators;
#[allow(clippy::missing_errors_doc)]
pub mod history;
#[allow(clippy::missing_errors_doc)]
pub mod mode;
#[allow(clippy::missing_errors_doc)]
pub mod schedules;
#[allow(clippy::missing_errors_doc)]
pub mod snapshot;
pub mod sse;

use axum::Router;
use axum::routing::{get, patch, post, put};

use greenguard_app::ports::{
    EventPublisher, GreenhouseStore, ScheduleGenerator, ScheduleRepository,
    SensorHistoryRepository,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S, P, H, G, R>() -> Router<AppState<S, P, H, G, R>>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    Router::new()
        // Greenhouse state
        .route("/snapshot", get(snapshot::get::<S, P, H, G, R>))
        .route("/sensors", put(snapshot::ingest::<S, P, H, G, R>))
        .route("/actuators/{actuator}", put(actuators::set::<S, P, H, G, R>))
        .route(
            "/actuators/{actuator}/toggle",
            post(actuators::toggle::<S, P, H, G, R>),
        )
        .route("/mode", put(mode::set::<S, P, H, G, R>))
        .route("/mode/toggle", post(mode::toggle::<S, P, H, G, R>))
        // History
        .route("/history", get(history::daily::<S, P, H, G, R>))
        // Schedules
        .route(
            "/schedules/generate",
            post(schedules::generate::<S, P, H, G, R>),
        )
        .route("/schedules/{owner}", get(schedules::list::<S, P, H, G, R>))
        .route(
            "/schedules/{owner}/{day}",
            get(schedules::get::<S, P, H, G, R>).put(schedules::save::<S, P, H, G, R>),
        )
        .route(
            "/schedules/{owner}/{day}/slots/{index}",
            patch(schedules::set_slot::<S, P, H, G, R>),
        )
        // Events
        .route("/events/stream", get(sse::stream::<S, P, H, G, R>))
}
