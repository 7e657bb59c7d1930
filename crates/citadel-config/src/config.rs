//! Root configuration type.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use citadel_auth::MIN_SECRET_LEN;
use serde::{Deserialize, Serialize};

use crate::{AuthConfigSection, ConfigError, LoggingConfig, MetricsConfig, ServerConfig};

/// Complete Citadel configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use citadel_config::CitadelConfig;
///
/// let config = CitadelConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.auth.xsrf_protection);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct CitadelConfig {
    /// HTTP transport.
    #[serde(default)]
    pub server: ServerConfig,

    /// Session authentication.
    #[serde(default)]
    pub auth: AuthConfigSection,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl CitadelConfig {
    /// Checks values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Rejected` if:
    /// - `server.http_addr` is not a socket address
    /// - `server.body_timeout_ms` is zero
    /// - `auth.xsrf_cookie_ttl_secs` or `auth.session_ttl_secs` is zero
    /// - `auth.secret` is not base64 or decodes to fewer than 32 bytes
    /// - `auth.issuer` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .server
            .http_addr
            .parse::<std::net::SocketAddr>()
            .is_err()
        {
            return Err(ConfigError::rejected(
                "server",
                "http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.body_timeout_ms == 0 {
            return Err(ConfigError::rejected(
                "server",
                "body_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.auth.xsrf_cookie_ttl_secs == 0 {
            return Err(ConfigError::rejected(
                "auth",
                "xsrf_cookie_ttl_secs",
                "must be greater than zero",
            ));
        }

        if self.auth.session_ttl_secs == Some(0) {
            return Err(ConfigError::rejected(
                "auth",
                "session_ttl_secs",
                "must be greater than zero, or absent for non-expiring sessions",
            ));
        }

        if self.auth.issuer.is_empty() {
            return Err(ConfigError::rejected("auth", "issuer", "must not be empty"));
        }

        if let Some(secret) = &self.auth.secret {
            let decoded = STANDARD
                .decode(secret.trim())
                .map_err(|e| ConfigError::rejected("auth", "secret", format!("not base64: {e}")))?;
            if decoded.len() < MIN_SECRET_LEN {
                return Err(ConfigError::rejected(
                    "auth",
                    "secret",
                    format!(
                        "decodes to {} bytes, at least {MIN_SECRET_LEN} required",
                        decoded.len()
                    ),
                ));
            }
        }

        citadel_telemetry::logging::create_env_filter(&self.logging.level)
            .map_err(|e| ConfigError::rejected("logging", "level", e.to_string()))?;

        Ok(())
    }

    /// Development preset: pretty debug logs, cookies without `Secure`.
    ///
    /// ```
    /// use citadel_config::CitadelConfig;
    ///
    /// let config = CitadelConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert!(!config.auth.secure_cookies);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = citadel_telemetry::LogFormat::Pretty;
        config.logging.include_location = true;
        config.auth.secure_cookies = false;
        config
    }

    /// Production preset: JSON logs, metrics recorder installed.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.format = citadel_telemetry::LogFormat::Json;
        config.metrics.enabled = true;
        config
    }
}
