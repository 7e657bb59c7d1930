//! # Citadel Server
//!
//! Request dispatch and HTTP transport for Citadel.
//!
//! - [`Dispatcher`]: resolves a route, merges path, query and form
//!   parameters, runs the handler inside a [`RequestScope`] and writes a
//!   JSON or binary response
//! - [`HandlerRegistry`]: typed async handlers registered by identifier
//! - [`Server`]: HTTP/1.1 listener with a body timeout and graceful shutdown
//!
//! ## Example
//!
//! ```rust,no_run
//! use citadel_core::CitadelError;
//! use citadel_router::Route;
//! use citadel_server::{Dispatcher, HandlerRegistry, Parameters, Server, ServerConfig};
//! use http::Method;
//! use serde_json::{json, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut handlers = HandlerRegistry::new();
//!     handlers.payload("getGame", |_ctx, params: Parameters, _body: Value| async move {
//!         Ok::<_, CitadelError>(json!({ "id": params.require("id")? }))
//!     });
//!
//!     let dispatcher = Dispatcher::builder()
//!         .route(Method::GET, "/games/:id", Route::payload("getGame"))?
//!         .handlers(handlers)
//!         .build()?;
//!
//!     Server::new(ServerConfig::default(), dispatcher).run().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod dispatcher;
pub mod error;
mod form;
pub mod handler;
pub mod params;
mod response;
pub mod scope;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::ServerError;
pub use handler::{BoxFuture, HandlerRegistry, StreamReply};
pub use params::{ParamValue, Parameters, UploadedFile, FILES_KEY};
pub use response::error_response;
pub use scope::{NoopScope, RequestScope};
pub use server::{HttpResponse, Server};
pub use shutdown::{ConnectionTracker, ShutdownSignal};
