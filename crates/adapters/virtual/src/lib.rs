//! # greenguard-adapter-virtual
//!
//! Virtual/demo adapter that stands in for the field hardware and the
//! remote schedule generator.
//!
//! ## Provided pieces
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`InMemoryGreenhouseStore`] | `GreenhouseStore` | Flat root in memory, seeded with actuators off and manual mode |
//! | [`SensorSimulator`] |: | Deterministic day/night feed that reacts to the actuators |
//! | [`RuleBasedScheduleGenerator`] | `ScheduleGenerator` | Derives a day of slots from the averages and the threshold table |
//!
//! ## Dependency rule
//!
//! Depends on `greenguard-app` (port traits) and `greenguard-domain` only.

mod generator;
mod simulator;
mod store;

pub use generator::RuleBasedScheduleGenerator;
pub use simulator::SensorSimulator;
pub use store::InMemoryGreenhouseStore;
