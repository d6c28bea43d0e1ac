//! Shared application state for axum handlers.

use std::sync::Arc;

use greenguard_app::event_bus::InProcessEventBus;
use greenguard_app::ports::{
    EventPublisher, GreenhouseStore, ScheduleGenerator, ScheduleRepository,
    SensorHistoryRepository,
};
use greenguard_app::services::greenhouse_service::GreenhouseService;
use greenguard_app::services::history_service::HistoryService;
use greenguard_app::services::schedule_service::ScheduleService;

/// Application state shared across all axum handlers.
///
/// Generic over the store, event publisher, history repository, schedule
/// generator and schedule repository to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrappers are cloned.
pub struct AppState<S, P, H, G, R> {
    /// Snapshot, sensor ingestion, actuator and mode commands.
    pub greenhouse: Arc<GreenhouseService<S, P>>,
    /// Daily history summaries.
    pub history: Arc<HistoryService<H>>,
    /// Schedule generation and persistence.
    pub schedules: Arc<ScheduleService<H, G, R, P>>,
    /// Event bus for SSE subscriptions.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<S, P, H, G, R> Clone for AppState<S, P, H, G, R> {
    fn clone(&self) -> Self {
        Self {
            greenhouse: Arc::clone(&self.greenhouse),
            history: Arc::clone(&self.history),
            schedules: Arc::clone(&self.schedules),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<S, P, H, G, R> AppState<S, P, H, G, R>
where
    S: GreenhouseStore + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    H: SensorHistoryRepository + Send + Sync + 'static,
    G: ScheduleGenerator + Send + Sync + 'static,
    R: ScheduleRepository + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Services are shared with the daemon's background tasks, so they are
    /// taken already wrapped.
    pub fn from_arcs(
        greenhouse: Arc<GreenhouseService<S, P>>,
        history: Arc<HistoryService<H>>,
        schedules: Arc<ScheduleService<H, G, R, P>>,
        event_bus: Arc<InProcessEventBus>,
    ) -> Self {
        Self {
            greenhouse,
            history,
            schedules,
            event_bus,
        }
    }
}
