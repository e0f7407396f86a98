//! Service overview handler.
//!
//! The dashboard page itself is rendered by a separate front end; `/`
//! answers with a plain-text overview of the API it consumes.

use axum::{http::StatusCode, response::IntoResponse};
use tracing::debug;

/// Handler for the / endpoint.
pub async fn index_handler() -> impl IntoResponse {
    debug!("Processing / request");

    let version = env!("CARGO_PKG_VERSION");
    let doc = format!(
        r#"DEVOPS DASHBOARD
================

VERSION: {version}

HTTP ENDPOINTS
--------------
GET  /health          - Liveness check, always {{"status": "ok"}}
GET  /api/health      - Uptime, requests served, current cpu/memory
GET  /api/stats       - Current cpu/memory plus recent history
GET  /api/meta        - Git, pipeline stages, container and system info
GET  /api/logs        - Most recent requests, newest first
GET  /api/ci          - Current CI state
POST /api/ci/update   - Update CI state (X-CI-TOKEN header or ?token=)

CI UPDATE EXAMPLE
-----------------
curl -X POST http://localhost:5000/api/ci/update \
     -H "X-CI-TOKEN: $CI_UPDATE_TOKEN" \
     -H "Content-Type: application/json" \
     -d '{{"build": "Success", "test": "Running", "commit": "abc1234"}}'
"#
    );

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        doc,
    )
}
