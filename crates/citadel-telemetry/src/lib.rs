//! Logging and metrics for Citadel.
//!
//! - **Logging**: `tracing` events rendered as JSON lines or pretty text
//! - **Metrics**: request, latency and session-failure metrics through the
//!   `metrics` facade, with an optional Prometheus recorder
//!
//! # Example
//!
//! ```rust,no_run
//! use citadel_telemetry::{init_telemetry, LogConfig, MetricsConfig};
//!
//! init_telemetry(&LogConfig::default(), &MetricsConfig { enabled: true, ..Default::default() })
//!     .expect("telemetry");
//!
//! // Later, e.g. from an admin handler:
//! let exposition = citadel_telemetry::render_metrics().unwrap_or_default();
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use self::error::TelemetryError;
pub use self::logging::{init_logging, LogConfig, LogFormat};
pub use self::metrics::{
    init_metrics, record_auth_failure, record_request, render_metrics, InFlightGuard,
    MetricsConfig,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Installs logging, then metrics.
///
/// # Errors
///
/// Returns the first subsystem failure.
pub fn init_telemetry(log: &LogConfig, metrics: &MetricsConfig) -> TelemetryResult<()> {
    init_logging(log)?;
    init_metrics(metrics)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_telemetry_with_everything_disabled() {
        let log = LogConfig {
            enabled: false,
            ..LogConfig::default()
        };
        assert!(init_telemetry(&log, &MetricsConfig::default()).is_ok());
        assert!(render_metrics().is_none());
    }
}
