//! # greenguard-domain
//!
//! Pure domain model for the greenguard greenhouse controller.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Sensors** and the defensive parsing of raw readings
//! - Define **Actuators** (fan, pump, lid, bulb) and their binary state
//! - Define the **Control mode** (manual / automatic)
//! - Define the **Threshold controller** rules as pure functions
//! - Define **Schedules** (15-minute actuator plans) and **History** aggregation
//! - Define **Events** (state-change records)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod actuator;
pub mod control;
pub mod event;
pub mod history;
pub mod mode;
pub mod schedule;
pub mod sensor;
pub mod snapshot;
pub mod thresholds;
