//! # greenguardd: greenguard daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Initialise the `SQLite` connection pool and run migrations
//! - Construct the store and repositories (adapters)
//! - Construct application services, injecting adapters via port traits
//! - Spawn background tasks: threshold controller, history recorder,
//!   history pruner and the optional sensor simulator
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use greenguard_adapter_http_axum::state::AppState;
use greenguard_adapter_storage_sqlite_sqlx::{
    SqliteGreenhouseStore, SqliteScheduleRepository, SqliteSensorHistoryRepository,
};
use greenguard_adapter_virtual::{RuleBasedScheduleGenerator, SensorSimulator};
use greenguard_app::event_bus::InProcessEventBus;
use greenguard_app::services::greenhouse_service::GreenhouseService;
use greenguard_app::services::history_service::HistoryService;
use greenguard_app::services::schedule_service::ScheduleService;
use greenguard_app::services::threshold_controller::ThresholdController;

use crate::config::Config;

const EVENT_BUS_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_logging(&config.logging.filter);

    // Database
    let db = greenguard_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database.url.clone(),
    }
    .build()
    .await
    .with_context(|| format!("failed to open database {}", config.database.url))?;
    let pool = db.pool().clone();

    // Adapters
    let store = SqliteGreenhouseStore::new(pool.clone());
    let history_repo = Arc::new(SqliteSensorHistoryRepository::new(pool.clone()));
    let schedule_repo = SqliteScheduleRepository::new(pool);
    let generator = RuleBasedScheduleGenerator::new(config.control.thresholds);

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(EVENT_BUS_CAPACITY));

    // Services
    let greenhouse = Arc::new(GreenhouseService::new(store, Arc::clone(&event_bus)));
    let history = Arc::new(HistoryService::new(Arc::clone(&history_repo)));
    let schedules = Arc::new(ScheduleService::new(
        Arc::clone(&history_repo),
        generator,
        schedule_repo,
        Arc::clone(&event_bus),
    ));

    // Background tasks
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    if config.control.enabled {
        let controller = ThresholdController::new(
            config.control.thresholds,
            Arc::clone(&greenhouse),
            Arc::clone(&event_bus),
        );
        tasks.push(tokio::spawn(controller.run(event_bus.subscribe())));
    } else {
        tracing::info!("threshold controller disabled");
    }

    {
        let history = Arc::clone(&history);
        let events = event_bus.subscribe();
        let interval = config.history.record_interval();
        tasks.push(tokio::spawn(async move {
            history.run_recorder(events, interval).await;
        }));
    }

    {
        let history = Arc::clone(&history);
        let retention_days = config.history.retention_days;
        let every = config.history.prune_interval();
        tasks.push(tokio::spawn(async move {
            history.run_pruner(retention_days, every).await;
        }));
    }

    if config.simulator.enabled {
        let simulator = SensorSimulator::new(config.simulator.ticks_per_day);
        tasks.push(tokio::spawn(
            simulator.run(Arc::clone(&greenhouse), config.simulator.interval()),
        ));
    }

    // HTTP
    let state = AppState::from_arcs(greenhouse, history, schedules, Arc::clone(&event_bus));
    let app = greenguard_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "greenguardd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    for task in &tasks {
        task.abort();
    }
    tracing::info!("greenguardd stopped");
    Ok(())
}

fn init_logging(filter: &str) {
    let (filter, invalid) = match EnvFilter::try_new(filter) {
        Ok(filter) => (filter, None),
        Err(err) => (EnvFilter::new("info"), Some(err)),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    if let Some(err) = invalid {
        tracing::warn!(%err, "invalid log filter, falling back to info");
    }
}

/// Resolves on Ctrl-C, or on SIGTERM where signals exist.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
