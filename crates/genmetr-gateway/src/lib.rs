//! GenMetr gateway library entry.
//!
//! Wires the metrics core into an axum service: strict config, shared state,
//! the request-metrics middleware and the scrape endpoint. Consumed by the
//! binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod cli;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
pub mod services;
