//! GenMetr core: label-keyed counters and histograms, their text exposition,
//! and the request instrumentation guard.
//!
//! This crate carries no HTTP server or runtime dependencies. The gateway
//! wires it into an axum stack; anything else that can report a method, a
//! route template and a status code can use it the same way.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Observations that
//! cannot be applied surface as `GenMetrError` and are never allowed to take
//! down the request path.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod instrument;
pub mod metrics;

/// Shared result type.
pub use error::{GenMetrError, Result};
pub use instrument::{HttpMetrics, HttpMetricsOptions, RequestGuard, ResponseStatus};
pub use metrics::{
    CounterVec, HistogramVec, MetricDescriptor, MetricHandle, MetricKind, Registry, SeriesRef,
};
