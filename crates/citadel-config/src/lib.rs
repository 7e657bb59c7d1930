//! Typed configuration for Citadel services.
//!
//! - TOML and JSON files
//! - Environment variable overrides (`PREFIX__SECTION__KEY`)
//! - Strict parsing: unknown fields are errors
//! - Layering: defaults, then file, then environment
//!
//! [`CitadelConfig`] holds four sections:
//!
//! - [`ServerConfig`] - bind address and timeouts
//! - [`AuthConfigSection`] - token secret, XSRF protection, cookie attributes
//! - [`LoggingConfig`] - log level and format
//! - [`MetricsConfig`] - Prometheus recorder
//!
//! # Example
//!
//! ```no_run
//! use citadel_config::ConfigLoader;
//!
//! # fn main() -> Result<(), citadel_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_dotenv()
//!     .with_optional_file("citadel.toml")?
//!     .with_env_prefix("CITADEL")
//!     .load()?;
//!
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! body_timeout_ms = 30000
//! shutdown_timeout_secs = 30
//!
//! [auth]
//! secret = "base64-encoded, at least 32 bytes"
//! xsrf_protection = true
//! secure_cookies = true
//! same_site = "lax"
//! session_ttl_secs = 3600
//! xsrf_cookie_ttl_secs = 1800
//! issuer = "citadel"
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::CitadelConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
