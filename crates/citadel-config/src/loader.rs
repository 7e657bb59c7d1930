//! Layered configuration loading.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;

use citadel_core::SameSite;
use citadel_telemetry::LogFormat;

use crate::{CitadelConfig, ConfigError};

/// Loads a [`CitadelConfig`] from layered sources.
///
/// Later layers override earlier ones:
/// 1. Built-in defaults or a preset
/// 2. A TOML or JSON file (sections it omits keep their defaults)
/// 3. Environment variables named `PREFIX__SECTION__KEY`
///
/// # Example
///
/// ```no_run
/// use citadel_config::ConfigLoader;
///
/// # fn main() -> Result<(), citadel_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("citadel.toml")?
///     .with_env_prefix("CITADEL")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: CitadelConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CitadelConfig::default(),
            env_prefix: None,
        }
    }

    /// Starts from the development preset.
    ///
    /// ```
    /// use citadel_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = CitadelConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = CitadelConfig::production();
        self
    }

    /// Loads a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unreadable, has an
    /// unsupported extension, or does not parse (unknown fields included).
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Loads a file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`with_file`](Self::with_file) when the file exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration text in the given format (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown or parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use citadel_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [auth]
    ///     xsrf_protection = false
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(!config.auth.xsrf_protection);
    /// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content).map_err(|e| ConfigError::schema("inline toml", e))?,
            "json" => {
                serde_json::from_str(content).map_err(|e| ConfigError::schema("inline json", e))?
            }
            other => return Err(ConfigError::UnknownFormat(other.to_string())),
        };
        Ok(self)
    }

    /// Enables environment overrides with the given prefix.
    ///
    /// With prefix `CITADEL`:
    /// - `CITADEL__SERVER__HTTP_ADDR=127.0.0.1:9000`
    /// - `CITADEL__AUTH__SECRET=<base64>`
    /// - `CITADEL__AUTH__SESSION_TTL_SECS=none`
    /// - `CITADEL__LOGGING__LEVEL=debug`
    /// - `CITADEL__LOGGING__INCLUDE_LOCATION=true`
    /// - `CITADEL__METRICS__DURATION_BUCKETS=0.01,0.1,1,10`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads a `.env` file into the process environment, if present.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(mut self) -> Result<CitadelConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: HashMap<String, String> = env::vars()
                .filter(|(k, _)| k.starts_with(&prefix))
                .collect();
            self.apply_env_vars(&prefix, &vars)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> CitadelConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<CitadelConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        let origin = path.display().to_string();
        match extension.as_deref() {
            Some("toml") => toml::from_str(content).map_err(|e| ConfigError::schema(origin, e)),
            Some("json") => serde_json::from_str(content).map_err(|e| ConfigError::schema(origin, e)),
            _ => Err(ConfigError::UnknownFormat(origin)),
        }
    }

    fn apply_env_vars(
        &mut self,
        prefix: &str,
        vars: &HashMap<String, String>,
    ) -> Result<(), ConfigError> {
        for (key, value) in vars {
            self.apply_env_var(key, value, prefix)?;
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "BODY_TIMEOUT_MS"] => config.server.body_timeout_ms = parse_u64(key, value)?,
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_u64(key, value)?;
            }

            ["AUTH", "SECRET"] => {
                config.auth.secret = (!value.is_empty()).then(|| value.to_string());
            }
            ["AUTH", "XSRF_PROTECTION"] => config.auth.xsrf_protection = parse_bool(key, value)?,
            ["AUTH", "SECURE_COOKIES"] => config.auth.secure_cookies = parse_bool(key, value)?,
            ["AUTH", "SAME_SITE"] => {
                config.auth.same_site = match value.to_lowercase().as_str() {
                    "none" => SameSite::None,
                    "lax" => SameSite::Lax,
                    "strict" => SameSite::Strict,
                    _ => {
                        return Err(ConfigError::env_override(
                            key,
                            value,
                            "'none', 'lax' or 'strict'",
                        ))
                    }
                };
            }
            ["AUTH", "SESSION_TTL_SECS"] => {
                config.auth.session_ttl_secs = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.parse().map_err(|_| {
                        ConfigError::env_override(key, value, "an integer or 'none'")
                    })?)
                };
            }
            ["AUTH", "XSRF_COOKIE_TTL_SECS"] => {
                config.auth.xsrf_cookie_ttl_secs = parse_u64(key, value)?;
            }
            ["AUTH", "ISSUER"] => config.auth.issuer = value.to_string(),

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_bool(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::env_override(key, value, "'json' or 'pretty'")),
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = parse_bool(key, value)?;
            }

            ["METRICS", "ENABLED"] => config.metrics.enabled = parse_bool(key, value)?,
            ["METRICS", "DURATION_BUCKETS"] => {
                config.metrics.duration_buckets = parse_buckets(key, value)?;
            }

            _ => {}
        }

        Ok(())
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_override(key, value, "an integer"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_override(key, value, "a boolean")),
    }
}

// Comma-separated seconds; an empty value restores the default buckets.
fn parse_buckets(key: &str, value: &str) -> Result<Vec<f64>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|bucket| !bucket.is_empty())
        .map(|bucket| match bucket.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds > 0.0 => Ok(seconds),
            _ => Err(ConfigError::env_override(
                key,
                value,
                "comma-separated positive numbers of seconds",
            )),
        })
        .collect()
}
