//! # greenguard-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for the snapshot, sensor ingestion, actuator and
//!   mode commands, history summaries and schedules (`/api/...`)
//! - Stream domain events to clients as **server-sent events**
//!   (`/api/events/stream`)
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application errors into JSON error bodies with matching status codes
//!
//! ## Dependency rule
//! Depends on `greenguard-app` (for port traits and services) and
//! `greenguard-domain` (for types used in request/response mapping). Never
//! leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
