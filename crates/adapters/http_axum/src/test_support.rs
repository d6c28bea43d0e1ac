//! Fixtures shared by the handler tests.

use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use greenguard_adapter_virtual::{InMemoryGreenhouseStore, RuleBasedScheduleGenerator};
use greenguard_app::event_bus::InProcessEventBus;
use greenguard_app::ports::{ScheduleRepository, SensorHistoryRepository};
use greenguard_app::services::greenhouse_service::GreenhouseService;
use greenguard_app::services::history_service::HistoryService;
use greenguard_app::services::schedule_service::ScheduleService;
use greenguard_domain::error::GreenGuardError;
use greenguard_domain::history::HistoryPoint;
use greenguard_domain::schedule::SavedSchedule;
use greenguard_domain::snapshot::RawRoot;
use greenguard_domain::time::Timestamp;

use crate::router;
use crate::state::AppState;

#[derive(Default)]
pub struct InMemoryHistoryRepo {
    points: Mutex<Vec<HistoryPoint>>,
}

impl InMemoryHistoryRepo {
    pub fn seed(&self, point: HistoryPoint) {
        self.points.lock().unwrap().push(point);
    }
}

impl SensorHistoryRepository for InMemoryHistoryRepo {
    fn record(
        &self,
        point: HistoryPoint,
    ) -> impl Future<Output = Result<HistoryPoint, GreenGuardError>> + Send {
        self.seed(point.clone());
        async { Ok(point) }
    }

    fn find_in_range(
        &self,
        from: Timestamp,
        to: Timestamp,
    ) -> impl Future<Output = Result<Vec<HistoryPoint>, GreenGuardError>> + Send {
        let mut found: Vec<_> = self
            .points
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.recorded_at >= from && p.recorded_at <= to)
            .cloned()
            .collect();
        found.sort_by_key(|p| p.recorded_at);
        async { Ok(found) }
    }

    fn purge_before(
        &self,
        before: Timestamp,
    ) -> impl Future<Output = Result<u64, GreenGuardError>> + Send {
        let mut points = self.points.lock().unwrap();
        let len = points.len();
        points.retain(|p| p.recorded_at >= before);
        let removed = (len - points.len()) as u64;
        async move { Ok(removed) }
    }
}

#[derive(Default)]
pub struct InMemoryScheduleRepo {
    schedules: Mutex<Vec<SavedSchedule>>,
}

impl ScheduleRepository for InMemoryScheduleRepo {
    fn upsert(
        &self,
        mut schedule: SavedSchedule,
    ) -> impl Future<Output = Result<SavedSchedule, GreenGuardError>> + Send {
        let mut schedules = self.schedules.lock().unwrap();
        match schedules
            .iter_mut()
            .find(|s| s.owner == schedule.owner && s.day == schedule.day)
        {
            Some(existing) => {
                schedule.id = existing.id;
                *existing = schedule.clone();
            }
            None => schedules.push(schedule.clone()),
        }
        async { Ok(schedule) }
    }

    fn get(
        &self,
        owner: &str,
        day: &str,
    ) -> impl Future<Output = Result<Option<SavedSchedule>, GreenGuardError>> + Send {
        let found = self
            .schedules
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.owner == owner && s.day == day)
            .cloned();
        async { Ok(found) }
    }

    fn list_by_owner(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<Vec<SavedSchedule>, GreenGuardError>> + Send {
        let mut found: Vec<_> = self
            .schedules
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.owner == owner)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.day.cmp(&b.day));
        async { Ok(found) }
    }
}

pub type TestState = AppState<
    InMemoryGreenhouseStore,
    Arc<InProcessEventBus>,
    Arc<InMemoryHistoryRepo>,
    RuleBasedScheduleGenerator,
    InMemoryScheduleRepo,
>;

/// Fully wired state over in-memory fakes.
pub struct TestApp {
    pub state: TestState,
    pub event_bus: Arc<InProcessEventBus>,
    pub history_repo: Arc<InMemoryHistoryRepo>,
}

impl TestApp {
    /// Store seeded with actuators off and manual mode.
    pub fn new() -> Self {
        Self::with_store(InMemoryGreenhouseStore::default())
    }

    /// Store with nothing in it.
    pub fn empty() -> Self {
        Self::with_store(InMemoryGreenhouseStore::with_root(RawRoot::new()))
    }

    fn with_store(store: InMemoryGreenhouseStore) -> Self {
        let event_bus = Arc::new(InProcessEventBus::new(16));
        let history_repo = Arc::new(InMemoryHistoryRepo::default());
        let state = AppState::from_arcs(
            Arc::new(GreenhouseService::new(store, Arc::clone(&event_bus))),
            Arc::new(HistoryService::new(Arc::clone(&history_repo))),
            Arc::new(ScheduleService::new(
                Arc::clone(&history_repo),
                RuleBasedScheduleGenerator::default(),
                InMemoryScheduleRepo::default(),
                Arc::clone(&event_bus),
            )),
            Arc::clone(&event_bus),
        );
        Self {
            state,
            event_bus,
            history_repo,
        }
    }

    pub fn router(&self) -> Router {
        router::build(self.state.clone())
    }
}

/// Send one request and decode the JSON response (`Null` for empty bodies).
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
