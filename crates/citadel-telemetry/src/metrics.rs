//! Request and session metrics.
//!
//! Metrics are recorded through the `metrics` facade and are no-ops until a
//! recorder is installed. [`init_metrics`] installs a Prometheus recorder whose
//! text exposition is available from [`render_metrics`].
//!
//! | Metric | Type | Labels |
//! |--------|------|--------|
//! | `citadel_requests_total` | Counter | `route`, `status` |
//! | `citadel_request_duration_seconds` | Histogram | `route` |
//! | `citadel_in_flight_requests` | Gauge | - |
//! | `citadel_auth_failures_total` | Counter | `reason` |
//!
//! Requests that match no route are labelled `route="unmatched"` so that
//! probing clients cannot inflate label cardinality.

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

/// Total dispatched requests.
pub const REQUESTS_TOTAL: &str = "citadel_requests_total";
/// Dispatch latency.
pub const REQUEST_DURATION: &str = "citadel_request_duration_seconds";
/// Requests currently being dispatched.
pub const IN_FLIGHT: &str = "citadel_in_flight_requests";
/// Rejected sessions by reason.
pub const AUTH_FAILURES: &str = "citadel_auth_failures_total";

/// Route label for requests that matched no route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether to install the Prometheus recorder.
    pub enabled: bool,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// Installs the global Prometheus recorder.
///
/// # Errors
///
/// Returns `TelemetryError::InvalidConfig` for an empty bucket list and
/// `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::InvalidConfig(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    describe_metrics();

    Ok(())
}

/// Renders metrics in Prometheus text format, or `None` before
/// [`init_metrics`].
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

/// Registers descriptions for the standard metrics.
pub fn describe_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of dispatched requests");
    describe_histogram!(REQUEST_DURATION, "Dispatch duration in seconds");
    describe_gauge!(IN_FLIGHT, "Requests currently being dispatched");
    describe_counter!(AUTH_FAILURES, "Rejected sessions by reason");
}

/// Records a completed request.
pub fn record_request(route: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "route" => route.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION, "route" => route.to_string()).record(duration.as_secs_f64());
}

/// Records a rejected session.
pub fn record_auth_failure(reason: &str) {
    counter!(AUTH_FAILURES, "reason" => reason.to_string()).increment(1);
}

/// Keeps `citadel_in_flight_requests` incremented while alive.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the in-flight gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT).decrement(1.0);
    }
}
