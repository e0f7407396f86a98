//! Request telemetry: counter, request log and host metric histories.
//!
//! `Telemetry` is constructed once at startup and shared by every handler.
//! The `track_requests` middleware records each completed request; the
//! stats and health handlers drive host sampling through `sample`.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::history::BoundedHistory;
use crate::system::{MetricsSampler, Sample};

/// Timestamp format of request log entries, e.g. `Mon 14:03:22 UTC`.
pub const LOG_TIMESTAMP_FORMAT: &str = "%a %H:%M:%S UTC";

/// Path prefix of static assets, which are not counted or logged.
pub const STATIC_PREFIX: &str = "/static";

/// One completed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub ts: String,
    pub path: String,
    pub status: u16,
}

/// Process-wide request and host telemetry.
pub struct Telemetry {
    started_at: Instant,
    requests: AtomicU64,
    logs: BoundedHistory<LogEntry>,
    cpu_history: BoundedHistory<f64>,
    mem_history: BoundedHistory<f64>,
    sampler: Option<Arc<dyn MetricsSampler>>,
}

impl Telemetry {
    pub fn new(
        log_capacity: usize,
        history_capacity: usize,
        sampler: Option<Arc<dyn MetricsSampler>>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            requests: AtomicU64::new(0),
            logs: BoundedHistory::new(log_capacity),
            cpu_history: BoundedHistory::new(history_capacity),
            mem_history: BoundedHistory::new(history_capacity),
            sampler,
        }
    }

    /// Counts a completed request and appends it to the request log.
    pub fn record_request(&self, path: &str, status: StatusCode) {
        self.record_request_at(path, status, Utc::now());
    }

    pub fn record_request_at(&self, path: &str, status: StatusCode, now: DateTime<Utc>) {
        self.requests.fetch_add(1, Ordering::Relaxed);

        let mut ts = String::with_capacity(16);
        if let Err(e) = write!(ts, "{}", now.format(LOG_TIMESTAMP_FORMAT)) {
            warn!("Failed to format request log timestamp: {}", e);
            return;
        }

        self.logs.push(LogEntry {
            ts,
            path: path.to_string(),
            status: status.as_u16(),
        });
    }

    pub fn requests_served(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.snapshot()
    }

    pub fn cpu_history(&self) -> Vec<f64> {
        self.cpu_history.snapshot()
    }

    pub fn mem_history(&self) -> Vec<f64> {
        self.mem_history.snapshot()
    }

    /// Samples host CPU and memory usage and appends the reading to the
    /// histories.
    ///
    /// Returns `None` when no sampler is available or sampling fails. The
    /// sampler runs on the blocking pool with no lock held.
    pub async fn sample(&self) -> Option<Sample> {
        let sampler = Arc::clone(self.sampler.as_ref()?);

        let result = match tokio::task::spawn_blocking(move || sampler.sample()).await {
            Ok(result) => result,
            Err(e) => Err(format!("sampler task failed: {}", e)),
        };

        match result {
            Ok(sample) => {
                self.cpu_history.push(sample.cpu_percent);
                self.mem_history.push(sample.memory_percent);
                Some(sample)
            }
            Err(e) => {
                warn!("Host metrics sampling failed: {}", e);
                None
            }
        }
    }
}

/// Returns true for paths that are excluded from telemetry.
pub fn is_static_asset(path: &str) -> bool {
    path.starts_with(STATIC_PREFIX)
}

/// Middleware recording every non-static request after it completes.
pub async fn track_requests(
    State(telemetry): State<Arc<Telemetry>>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();
    let response = next.run(request).await;

    if !is_static_asset(&path) {
        telemetry.record_request(&path, response.status());
        debug!("{} -> {}", path, response.status());
    }

    response
}
