//! Turns a loaded [`CitadelConfig`] into running parts.

use citadel_auth::{AuthError, TokenAuthenticatorBuilder};
use citadel_config::{CitadelConfig, ConfigError};
use citadel_server::{Dispatcher, Server, ServerConfig, ServerError};
use citadel_telemetry::TelemetryError;
use thiserror::Error;

/// Anything that can stop a service from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging or metrics could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),

    /// The authenticator could not be built.
    #[error("authentication setup error: {0}")]
    Auth(#[from] AuthError),

    /// The dispatcher could not be built or the listener failed.
    #[error("server error: {0}")]
    Server(#[from] ServerError),
}

/// Installs logging and, when enabled, the Prometheus recorder.
pub fn init_telemetry(config: &CitadelConfig) -> Result<(), StartupError> {
    citadel_telemetry::init_telemetry(
        &config.logging.to_log_config(),
        &config.metrics.to_metrics_config(),
    )?;
    Ok(())
}

/// Listener settings from the `[server]` section.
#[must_use]
pub fn server_config(config: &CitadelConfig) -> ServerConfig {
    ServerConfig::builder()
        .http_addr(config.server.http_addr.clone())
        .body_timeout(config.server.body_timeout())
        .shutdown_timeout(config.server.shutdown_timeout())
        .build()
}

/// An authenticator builder preloaded from the `[auth]` section.
///
/// Add a role finder before building if any route uses `if_authorized`.
#[must_use]
pub fn authenticator(config: &CitadelConfig) -> TokenAuthenticatorBuilder {
    let builder = citadel_auth::TokenAuthenticator::builder().config(config.auth.to_auth_config());
    match &config.auth.secret {
        Some(secret) => builder.secret_base64(secret.clone()),
        None => builder,
    }
}

/// Serves `dispatcher` with the `[server]` settings until SIGTERM or SIGINT.
pub async fn serve(config: &CitadelConfig, dispatcher: Dispatcher) -> Result<(), StartupError> {
    let server = Server::new(server_config(config), dispatcher);
    tracing::info!(addr = server.config().http_addr(), "starting citadel");
    server.run().await?;
    Ok(())
}
