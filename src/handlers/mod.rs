//! HTTP endpoint handlers for the dashboard.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/`: Plain-text service overview
//! - `/health`: Legacy liveness check
//! - `/api/health`: Process health with a host metrics sample
//! - `/api/stats`: Host metrics sample plus history
//! - `/api/meta`: Git, pipeline, container and system metadata
//! - `/api/logs`: Recent request log
//! - `/api/ci`, `/api/ci/update`: CI state read and webhook update

pub mod ci;
pub mod doc;
pub mod health;
pub mod logs;
pub mod meta;
pub mod stats;

// Re-export handlers
pub use ci::{ci_state_handler, ci_update_handler};
pub use doc::index_handler;
pub use health::{api_health_handler, legacy_health_handler};
pub use logs::logs_handler;
pub use meta::meta_handler;
pub use stats::stats_handler;

use chrono::{SecondsFormat, Utc};

/// Current UTC time as an RFC 3339 string with a `Z` suffix.
pub(crate) fn utc_now_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
