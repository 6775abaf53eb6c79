//! Request observability.
//!
//! The core guard does the bookkeeping; this module only adapts it to axum's
//! middleware signature and pulls the labels out of the request.

pub mod middleware;

pub use middleware::{method_label, track_http_metrics};
