//! Metadata endpoint handler.
//!
//! Combines the merged CI state with container and system details.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::ci::{GitInfo, Stages};
use crate::handlers::utc_now_string;
use crate::state::SharedState;

/// Compiler version the binary was built with.
pub const RUSTC_VERSION: &str = env!("VERGEN_RUSTC_SEMVER");

/// Build timestamp of the binary.
pub const BUILD_TIMESTAMP: &str = env!("VERGEN_BUILD_TIMESTAMP");

#[derive(Debug, Serialize)]
pub struct ContainerInfo {
    pub id: Option<String>,
    pub uptime_s: u64,
    pub port_mappings: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SystemInfo {
    pub host: Option<String>,
    pub rustc: &'static str,
    pub build_timestamp: &'static str,
    pub app_env: String,
    pub utc_time: String,
    pub ci_last_update: Option<DateTime<Utc>>,
}

/// Response body of `/api/meta`.
#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub git: GitInfo,
    pub stages: Stages,
    pub container: ContainerInfo,
    pub system: SystemInfo,
}

/// Handler for the /api/meta endpoint.
#[instrument(skip(state))]
pub async fn meta_handler(State(state): State<SharedState>) -> Json<MetaResponse> {
    debug!("Processing /api/meta request");

    let ci = state.ci.snapshot_with_defaults(&state.ci_defaults);

    Json(MetaResponse {
        git: ci.git,
        stages: ci.stages,
        container: ContainerInfo {
            id: state.hostname.clone(),
            uptime_s: state.telemetry.uptime_seconds(),
            port_mappings: state.config.port_mappings.clone(),
        },
        system: SystemInfo {
            host: state.hostname.clone(),
            rustc: RUSTC_VERSION,
            build_timestamp: BUILD_TIMESTAMP,
            app_env: state.config.app_env().to_string(),
            utc_time: utc_now_string(),
            ci_last_update: ci.last_update,
        },
    })
}
