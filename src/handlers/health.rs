//! Health check endpoint handlers.
//!
//! `/health` is the minimal liveness probe kept for older checks and always
//! answers `{"status": "ok"}`. `/api/health` reports uptime, request count
//! and a fresh host metrics sample.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::handlers::utc_now_string;
use crate::state::SharedState;

/// Response body of `/api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub uptime_s: u64,
    pub requests_served: u64,
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub utc_time: String,
}

/// Handler for the legacy /health endpoint.
pub async fn legacy_health_handler() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Handler for the /api/health endpoint.
#[instrument(skip(state))]
pub async fn api_health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    debug!("Processing /api/health request");

    let sample = state.telemetry.sample().await;

    Json(HealthResponse {
        ok: true,
        uptime_s: state.telemetry.uptime_seconds(),
        requests_served: state.telemetry.requests_served(),
        cpu: sample.map(|s| s.cpu_percent),
        memory: sample.map(|s| s.memory_percent),
        utc_time: utc_now_string(),
    })
}
