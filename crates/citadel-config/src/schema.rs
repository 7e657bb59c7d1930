//! Configuration sections.

use citadel_auth::AuthConfig;
use citadel_core::SameSite;
use citadel_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP transport section.
///
/// # Example
///
/// ```
/// use citadel_config::ServerConfig;
///
/// let config = ServerConfig {
///     http_addr: "127.0.0.1:3000".to_string(),
///     ..ServerConfig::default()
/// };
/// assert_eq!(config.body_timeout().as_millis(), 30_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Time allowed to receive a request body, in milliseconds.
    #[serde(default = "default_body_timeout")]
    pub body_timeout_ms: u64,

    /// Time allowed for open connections to finish after shutdown, in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    /// Body collection timeout.
    #[must_use]
    pub const fn body_timeout(&self) -> Duration {
        Duration::from_millis(self.body_timeout_ms)
    }

    /// Graceful shutdown timeout.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            body_timeout_ms: default_body_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_body_timeout() -> u64 {
    30_000
}

fn default_shutdown_timeout() -> u64 {
    30
}

/// Session authentication section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthConfigSection {
    /// Base64 signing secret (at least 32 bytes once decoded). When absent a
    /// per-process secret is generated.
    #[serde(default)]
    pub secret: Option<String>,

    /// Require the `XSRF-TOKEN` header on authenticated calls.
    #[serde(default = "default_true")]
    pub xsrf_protection: bool,

    /// Mark session cookies `Secure`.
    #[serde(default = "default_true")]
    pub secure_cookies: bool,

    /// `SameSite` attribute of session cookies.
    #[serde(default)]
    pub same_site: SameSite,

    /// Default session lifetime in seconds; `None` issues non-expiring tokens.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: Option<u64>,

    /// Lifetime of the `xsrfToken` cookie in seconds.
    #[serde(default = "default_xsrf_cookie_ttl")]
    pub xsrf_cookie_ttl_secs: u64,

    /// Token issuer.
    #[serde(default = "default_issuer")]
    pub issuer: String,
}

impl AuthConfigSection {
    /// Authenticator settings for this section. The secret is passed
    /// separately to the authenticator builder.
    #[must_use]
    pub fn to_auth_config(&self) -> AuthConfig {
        AuthConfig {
            issuer: self.issuer.clone(),
            xsrf_protection: self.xsrf_protection,
            secure_cookies: self.secure_cookies,
            same_site: self.same_site,
            xsrf_cookie_ttl: Duration::from_secs(self.xsrf_cookie_ttl_secs),
            session_ttl: self.session_ttl_secs.map(Duration::from_secs),
        }
    }
}

impl Default for AuthConfigSection {
    fn default() -> Self {
        Self {
            secret: None,
            xsrf_protection: true,
            secure_cookies: true,
            same_site: SameSite::default(),
            session_ttl_secs: default_session_ttl(),
            xsrf_cookie_ttl_secs: default_xsrf_cookie_ttl(),
            issuer: default_issuer(),
        }
    }
}

#[allow(clippy::unnecessary_wraps)]
fn default_session_ttl() -> Option<u64> {
    Some(3600)
}

fn default_xsrf_cookie_ttl() -> u64 {
    1800
}

fn default_issuer() -> String {
    "citadel".to_string()
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Install the log subscriber.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line.
    #[serde(default)]
    pub include_location: bool,
}

impl LoggingConfig {
    /// Logging settings for `citadel-telemetry`.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            span_events: false,
            file_line_info: self.include_location,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder.
    #[serde(default)]
    pub enabled: bool,

    /// Request duration buckets in seconds; empty uses the built-in buckets.
    #[serde(default)]
    pub duration_buckets: Vec<f64>,
}

impl MetricsConfig {
    /// Metrics settings for `citadel-telemetry`.
    #[must_use]
    pub fn to_metrics_config(&self) -> citadel_telemetry::MetricsConfig {
        let mut config = citadel_telemetry::MetricsConfig {
            enabled: self.enabled,
            ..Default::default()
        };
        if !self.duration_buckets.is_empty() {
            config.duration_buckets.clone_from(&self.duration_buckets);
        }
        config
    }
}

fn default_true() -> bool {
    true
}
