//! HTTP router for the dashboard API.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

use crate::error::not_found_handler;
use crate::handlers::{
    api_health_handler, ci_state_handler, ci_update_handler, index_handler,
    legacy_health_handler, logs_handler, meta_handler, stats_handler,
};
use crate::state::SharedState;
use crate::telemetry::{track_requests, Telemetry};

/// Create the HTTP router with request telemetry applied to every route.
pub fn create_router(state: SharedState) -> Router {
    let routes = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(legacy_health_handler))
        .route("/api/health", get(api_health_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/meta", get(meta_handler))
        .route("/api/logs", get(logs_handler))
        .route("/api/ci", get(ci_state_handler))
        .route("/api/ci/update", post(ci_update_handler))
        .fallback(not_found_handler);

    with_telemetry(routes, state.telemetry.clone()).with_state(state)
}

/// Wraps `routes` so every request is recorded, including one whose handler
/// panics (recorded as a 500).
fn with_telemetry<S>(routes: Router<S>, telemetry: Arc<Telemetry>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    routes
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(telemetry, track_requests))
}
