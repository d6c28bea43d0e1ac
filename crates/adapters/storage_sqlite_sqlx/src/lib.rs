//! # greenguard-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `GreenhouseStore`, `SensorHistoryRepository` and
//!   `ScheduleRepository` ports defined in `greenguard-app`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `greenguard-app` (for port traits) and `greenguard-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod history_repo;
mod pool;
mod schedule_repo;
mod store;
mod timestamp;

pub use error::StorageError;
pub use history_repo::SqliteSensorHistoryRepository;
pub use pool::{Config, Database};
pub use schedule_repo::SqliteScheduleRepository;
pub use store::SqliteGreenhouseStore;
