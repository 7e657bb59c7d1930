//! Server error types.

use std::io;

use thiserror::Error;

/// Errors raised while assembling or running the server.
///
/// Request-level failures are [`citadel_core::CitadelError`]s and end up in
/// responses; these end up in `main`.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The bind address does not parse.
    #[error("invalid address '{addr}': {reason}")]
    InvalidAddress {
        /// The configured address.
        addr: String,
        /// Parser message.
        reason: String,
    },

    /// Binding the listener failed.
    #[error("failed to bind to {addr}")]
    Bind {
        /// The address.
        addr: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A route names a handler that was never registered.
    #[error("route {method} {pattern} names unregistered handler '{handler}'")]
    MissingHandler {
        /// Route method.
        method: String,
        /// Route pattern.
        pattern: String,
        /// Handler identifier.
        handler: String,
    },

    /// A route's execution mode does not match its handler.
    #[error("route {method} {pattern} expects a {expected} handler, '{handler}' is not one")]
    HandlerMismatch {
        /// Route method.
        method: String,
        /// Route pattern.
        pattern: String,
        /// Handler identifier.
        handler: String,
        /// `payload` or `stream`.
        expected: &'static str,
    },

    /// I/O error while serving.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_handler_display() {
        let err = ServerError::MissingHandler {
            method: "GET".to_string(),
            pattern: "/games/:id".to_string(),
            handler: "getGame".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "route GET /games/:id names unregistered handler 'getGame'"
        );
    }

    #[test]
    fn test_bind_error_keeps_source() {
        let err = ServerError::Bind {
            addr: "127.0.0.1:80".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
