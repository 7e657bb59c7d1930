//! # Citadel
//!
//! Request-dispatch core for a game-content web backend (scenarios, forums,
//! player sessions).
//!
//! - [`router`]: method-keyed route trees with `:param` captures
//! - [`server`]: parameter merging, request scopes, JSON and binary
//!   responses over HTTP/1.1
//! - [`auth`]: signed-cookie sessions with double-submit anti-forgery tokens
//! - [`config`] and [`telemetry`]: layered settings, logs and metrics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use citadel::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_optional_file("citadel.toml")?
//!         .with_env_prefix("CITADEL")
//!         .load()?;
//!     citadel::bootstrap::init_telemetry(&config)?;
//!
//!     let auth = Arc::new(citadel::bootstrap::authenticator(&config).build()?);
//!
//!     let mut handlers = HandlerRegistry::new();
//!     let session = Arc::clone(&auth);
//!     handlers.payload("whoAmI", move |ctx: RequestContext, _params: Parameters, _body: serde_json::Value| {
//!         let auth = Arc::clone(&session);
//!         async move {
//!             auth.if_connected(&ctx, |user| async move { Ok(serde_json::json!({ "user": user })) })
//!                 .await
//!         }
//!     });
//!
//!     let dispatcher = Dispatcher::builder()
//!         .route(Method::GET, "/me", Route::payload("whoAmI"))?
//!         .handlers(handlers)
//!         .build()?;
//!
//!     citadel::bootstrap::serve(&config, dispatcher).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bootstrap;

pub use citadel_auth as auth;
pub use citadel_config as config;
pub use citadel_core as core;
pub use citadel_router as router;
pub use citadel_server as server;
pub use citadel_telemetry as telemetry;

pub use bootstrap::StartupError;

/// Common imports.
///
/// ```rust
/// use citadel::prelude::*;
/// ```
pub mod prelude {
    pub use citadel_auth::{AuthConfig, RoleFinder, SessionClaim, TokenAuthenticator};
    pub use citadel_config::{CitadelConfig, ConfigLoader};
    pub use citadel_core::{CitadelError, CitadelResult, RequestContext, SetCookie};
    pub use citadel_router::{Disposition, Route, RouteTable};
    pub use citadel_server::{
        Dispatcher, HandlerRegistry, Parameters, RequestScope, Server, ServerConfig,
        StreamReply, UploadedFile,
    };
    pub use http::Method;
}
