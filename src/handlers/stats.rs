//! Host metrics endpoint handler.
//!
//! Every call takes a new sample, which is also what feeds the CPU and
//! memory histories.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Response body of `/api/stats`; histories are most recent first.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub cpu: Option<f64>,
    pub memory: Option<f64>,
    pub cpu_hist: Vec<f64>,
    pub mem_hist: Vec<f64>,
}

/// Handler for the /api/stats endpoint.
#[instrument(skip(state))]
pub async fn stats_handler(State(state): State<SharedState>) -> Json<StatsResponse> {
    debug!("Processing /api/stats request");

    let sample = state.telemetry.sample().await;

    Json(StatsResponse {
        cpu: sample.map(|s| s.cpu_percent),
        memory: sample.map(|s| s.memory_percent),
        cpu_hist: state.telemetry.cpu_history(),
        mem_hist: state.telemetry.mem_history(),
    })
}
