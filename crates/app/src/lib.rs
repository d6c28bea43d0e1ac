//! # greenguard-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `GreenhouseStore`: read the flat store root, write one key
//!   - `ActuatorCommandSink`: switch an actuator (used by the controller)
//!   - `SensorHistoryRepository`: append and query recorded readings
//!   - `ScheduleRepository`: persist daily schedules per owner
//!   - `ScheduleGenerator`: produce a day of slots from averages and a forecast
//!   - `EventPublisher`: publish domain events
//! - Define **driving/inbound** use-cases as service structs:
//!   - `GreenhouseService`: snapshot, ingest readings, switch actuators and mode
//!   - `ThresholdController`: the automatic control loop
//!   - `HistoryService`: record, summarise and prune readings
//!   - `ScheduleService`: generate, save, edit and list schedules
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `greenguard-domain` only (plus `tokio` for channels and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;
