//! HTTP/1.1 listener.
//!
//! Each connection runs on its own task. Request bodies are buffered under
//! the configured body timeout, then handed to the [`Dispatcher`]. On
//! shutdown the accept loop stops, open connections finish their current
//! request, and the server waits for them up to the shutdown timeout.
//!
//! # Example
//!
//! ```rust,no_run
//! use citadel_server::{Dispatcher, Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), citadel_server::ServerError> {
//!     let dispatcher = Dispatcher::builder().build()?;
//!     let config = ServerConfig::builder().http_addr("127.0.0.1:8080").build();
//!
//!     Server::new(config, dispatcher).run().await
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use citadel_core::CitadelError;
use http::{Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ServerError;
use crate::response::error_response;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Response type written to the wire.
pub type HttpResponse = Response<Full<Bytes>>;

/// Serves a [`Dispatcher`] over HTTP/1.1.
#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl Server {
    /// Creates a server.
    #[must_use]
    pub fn new(config: ServerConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Binds the configured address and serves until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await.map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

        self.serve(listener, shutdown).await
    }

    /// Serves on an already bound listener until `shutdown` triggers.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener's local address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, routes = self.dispatcher.routes().len(), "server listening");

        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let token = tracker.acquire();
                        let dispatcher = Arc::clone(&self.dispatcher);
                        let body_timeout = self.config.body_timeout();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            serve_connection(stream, remote_addr, dispatcher, body_timeout, shutdown).await;
                            drop(token);
                        });
                    }
                    Err(e) => warn!(error = %e, "failed to accept connection"),
                },
                () = shutdown.triggered() => break,
            }
        }

        drop(listener);
        let timeout = self.config.shutdown_timeout();
        info!(
            open_connections = tracker.active_connections(),
            timeout_ms = timeout.as_millis() as u64,
            "shutting down"
        );

        if tokio::time::timeout(timeout, tracker.drained()).await.is_err() {
            warn!(
                open_connections = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            );
        }

        info!("server stopped");
        Ok(())
    }
}

async fn serve_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    dispatcher: Arc<Dispatcher>,
    body_timeout: Duration,
    shutdown: ShutdownSignal,
) {
    let service = service_fn(move |request: Request<Incoming>| {
        let dispatcher = Arc::clone(&dispatcher);
        async move { handle_request(&dispatcher, body_timeout, request).await }
    });

    let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(connection);

    let result = tokio::select! {
        result = connection.as_mut() => result,
        () = shutdown.triggered() => {
            connection.as_mut().graceful_shutdown();
            connection.as_mut().await
        }
    };

    if let Err(e) = result {
        debug!(remote = %remote_addr, error = %e, "connection closed with error");
    }
}

async fn handle_request(
    dispatcher: &Dispatcher,
    body_timeout: Duration,
    request: Request<Incoming>,
) -> Result<HttpResponse, Infallible> {
    let (parts, body) = request.into_parts();

    let response = match tokio::time::timeout(body_timeout, body.collect()).await {
        Ok(Ok(collected)) => {
            dispatcher
                .dispatch(Request::from_parts(parts, collected.to_bytes()))
                .await
        }
        Ok(Err(e)) => {
            warn!(path = parts.uri.path(), error = %e, "failed to read request body");
            error_response(&CitadelError::bad_request("Failed to read request body"), None)
        }
        Err(_) => {
            warn!(path = parts.uri.path(), "request body timed out");
            error_response(&CitadelError::RequestTimeout, None)
        }
    };

    Ok(response.map(Full::new))
}
