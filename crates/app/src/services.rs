//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod greenhouse_service;
pub mod history_service;
pub mod schedule_service;
pub mod threshold_controller;
