//! Application state management for the dashboard.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers. Everything a handler reads or mutates lives here;
//! there are no process-wide globals.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::auth::CiAuth;
use crate::ci::{CiDefaults, CiStore};
use crate::config::Config;
use crate::system::{self, MetricsSampler, ProcSampler, DEFAULT_SAMPLE_WINDOW};
use crate::telemetry::Telemetry;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Application state shared across requests.
pub struct AppState {
    pub telemetry: Arc<Telemetry>,
    pub ci: CiStore,
    pub ci_auth: CiAuth,
    pub ci_defaults: CiDefaults,
    pub config: Arc<Config>,
    /// Host name, resolved once at startup.
    pub hostname: Option<String>,
}

impl AppState {
    pub fn new(config: Config, sampler: Option<Arc<dyn MetricsSampler>>) -> Self {
        let telemetry = Telemetry::new(config.log_capacity(), config.history_capacity(), sampler);
        Self {
            telemetry: Arc::new(telemetry),
            ci: CiStore::new(),
            ci_auth: CiAuth::new(config.ci_token()),
            ci_defaults: config.ci_defaults(),
            hostname: system::hostname(),
            config: Arc::new(config),
        }
    }

    /// Builds state with the host sampler the configuration asks for.
    pub fn from_config(config: Config) -> Self {
        let sampler = if config.enable_sampler.unwrap_or(true) {
            let window = config
                .sample_window_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SAMPLE_WINDOW);
            ProcSampler::detect(window).map(|s| Arc::new(s) as Arc<dyn MetricsSampler>)
        } else {
            None
        };

        match &sampler {
            Some(_) => debug!("Host metrics sampler enabled"),
            None => info!("Host metrics sampler unavailable; cpu/memory will be reported as null"),
        }

        let state = Self::new(config, sampler);
        info!("CI update webhook: {}", state.ci_auth);
        state
    }
}
