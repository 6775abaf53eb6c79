//! Axum router wiring.
//!
//! Layer order, outermost first: panic catcher, request metrics, routes.
//! A handler panic therefore passes through the metrics guard (recorded as
//! 500) before `CatchPanicLayer` turns it into a 500 response.

use axum::{middleware, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;

use genmetr_core::HttpMetrics;

use crate::{app_state::AppState, ops, services};

pub fn build_router(state: AppState) -> Router {
    let metrics_path = state.cfg().gateway.metrics_path.clone();
    let http_metrics = state.http_metrics().clone();

    let routes = Router::new()
        .route("/healthz", get(ops::healthz))
        .route(&metrics_path, get(ops::metrics))
        .route("/generate", get(services::generate))
        .with_state(state);

    instrument(routes, http_metrics)
}

/// Wrap any router with request metrics and panic recovery. Routes must be
/// added before calling this; later routes are not measured.
pub fn instrument(router: Router, http_metrics: HttpMetrics) -> Router {
    router
        .layer(middleware::from_fn_with_state(
            http_metrics,
            crate::obs::track_http_metrics,
        ))
        .layer(CatchPanicLayer::new())
}
