//! Synthetic traffic: random latency, random status.
//!
//! Lets a scraper see every series shape (successes, client errors, server
//! errors, a spread of durations) without any real backend.

use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::json;

use genmetr_core::instrument::status_label;

use crate::app_state::AppState;

pub async fn generate(State(state): State<AppState>) -> impl IntoResponse {
    let generator = &state.cfg().generator;

    // ThreadRng is !Send; draw everything before the first await.
    let (code, delay) = {
        let mut rng = rand::thread_rng();
        let code = generator.statuses.choose(&mut rng).copied().unwrap_or(200);
        let delay = rng.gen_range(0..=generator.max_delay_ms);
        (code, delay)
    };

    tokio::time::sleep(Duration::from_millis(delay)).await;

    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    tracing::debug!(status = code, delay_ms = delay, "generated response");

    if status.as_u16() >= 400 {
        (status, Json(json!({ "error": status_label(code) })))
    } else {
        (status, Json(json!({ "message": "OK" })))
    }
}
