//! Request log endpoint handler.

use axum::{extract::State, Json};

use crate::state::SharedState;
use crate::telemetry::LogEntry;

/// Handler for the /api/logs endpoint.
pub async fn logs_handler(State(state): State<SharedState>) -> Json<Vec<LogEntry>> {
    Json(state.telemetry.logs())
}
