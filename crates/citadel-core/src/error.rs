//! Error types for Citadel.
//!
//! Every failure that can end a request is a [`CitadelError`]. The dispatcher
//! turns it into a response with [`CitadelError::status_code`] and
//! [`CitadelError::to_envelope`]; nothing is retried.
//!
//! | Kind | Status | Client message |
//! |---|---|---|
//! | `RouteNotFound` | 404 | `Route not found` |
//! | `DuplicateRoute`, `InvalidRoute` | 500 | startup only |
//! | `AmbiguousRoute` | 500 | `Internal server error` |
//! | `AuthenticationMissing` | 403 | `Not connected` |
//! | `AuthenticationExpired` | 403 | `Session expired` |
//! | `AuthenticationRefused` | 403 | `Authentication refused` |
//! | `AuthorizationDenied` | 403 | `Not authorized` |
//! | `BadRequest` | 400 | parser message, or `Malformed request path` |
//! | `RequestTimeout` | 408 | `Request body timed out` |
//! | `Handler` | own status | own message |
//! | `Unexpected` | 500 | `Internal server error` |
//!
//! Server-side detail (ambiguous patterns, unexpected error chains) is only
//! available through `Display` and is never put in the envelope.

use citadel_router::RouteError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`CitadelError`].
pub type CitadelResult<T> = Result<T, CitadelError>;

/// Message sent to clients for every 500.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Classification of [`CitadelError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No route matches the method and path.
    RouteNotFound,
    /// A method and pattern were registered twice.
    DuplicateRoute,
    /// A pattern could not be parsed.
    InvalidRoute,
    /// Several capture branches match one concrete path.
    AmbiguousRoute,
    /// No session cookie on the request.
    AuthenticationMissing,
    /// The session token has expired.
    AuthenticationExpired,
    /// Bad signature, malformed token, wrong issuer or anti-forgery mismatch.
    AuthenticationRefused,
    /// Connected, but lacking a required role.
    AuthorizationDenied,
    /// The request path, body or form could not be parsed.
    BadRequest,
    /// The request body did not arrive in time.
    RequestTimeout,
    /// Structured error raised by a handler.
    Handler,
    /// Anything else.
    Unexpected,
}

impl ErrorKind {
    /// Returns the machine-readable code used in error envelopes.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RouteNotFound => "ROUTE_NOT_FOUND",
            Self::DuplicateRoute => "DUPLICATE_ROUTE",
            Self::InvalidRoute => "INVALID_ROUTE",
            Self::AmbiguousRoute => "AMBIGUOUS_ROUTE",
            Self::AuthenticationMissing => "AUTHENTICATION_MISSING",
            Self::AuthenticationExpired => "AUTHENTICATION_EXPIRED",
            Self::AuthenticationRefused => "AUTHENTICATION_REFUSED",
            Self::AuthorizationDenied => "AUTHORIZATION_DENIED",
            Self::BadRequest => "BAD_REQUEST",
            Self::RequestTimeout => "REQUEST_TIMEOUT",
            Self::Handler => "HANDLER_ERROR",
            Self::Unexpected => "UNEXPECTED_ERROR",
        }
    }
}

/// Standard error type for Citadel.
///
/// # Example
///
/// ```
/// use citadel_core::{CitadelError, ErrorKind};
/// use http::StatusCode;
///
/// fn load_scenario(id: &str) -> Result<(), CitadelError> {
///     if id.is_empty() {
///         return Err(CitadelError::handler(StatusCode::NOT_FOUND, "No such scenario"));
///     }
///     Ok(())
/// }
///
/// let err = load_scenario("").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::Handler);
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Error, Debug)]
pub enum CitadelError {
    /// No route for the request.
    #[error("Route not found: {method} {path}")]
    RouteNotFound {
        /// Request method.
        method: String,
        /// Request path.
        path: String,
    },

    /// Route table failure (duplicate, invalid or ambiguous route, or an
    /// undecodable request path).
    #[error(transparent)]
    Route(#[from] RouteError),

    /// No session cookie.
    #[error("Not connected")]
    AuthenticationMissing,

    /// Session token expired.
    #[error("Session expired")]
    AuthenticationExpired,

    /// Session token rejected.
    #[error("Authentication refused: {reason}")]
    AuthenticationRefused {
        /// Why the token was rejected (server side only).
        reason: String,
    },

    /// Subject lacks every required role.
    #[error("Not authorized")]
    AuthorizationDenied {
        /// The roles that would have granted access.
        required: Vec<String>,
    },

    /// Unparseable request body or form.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Parser message, safe to return to the client.
        message: String,
    },

    /// The request body did not finish arriving within the body timeout.
    #[error("Request body timed out")]
    RequestTimeout,

    /// Application error with its own status and payload.
    #[error("{message}")]
    Handler {
        /// HTTP status to answer with.
        status: StatusCode,
        /// Message returned to the client.
        message: String,
        /// Optional structured payload returned to the client.
        payload: Option<serde_json::Value>,
    },

    /// Anything else. Answered with an opaque 500.
    #[error("Unexpected error: {source:#}")]
    Unexpected {
        /// The underlying error, logged but never sent to clients.
        #[source]
        source: anyhow::Error,
    },
}

impl CitadelError {
    /// Creates a route-not-found error.
    #[must_use]
    pub fn route_not_found(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self::RouteNotFound {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Creates an authentication-refused error.
    #[must_use]
    pub fn refused(reason: impl Into<String>) -> Self {
        Self::AuthenticationRefused {
            reason: reason.into(),
        }
    }

    /// Creates an authorization-denied error.
    #[must_use]
    pub fn denied<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AuthorizationDenied {
            required: required.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a bad-request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Creates a handler error with a status and message.
    #[must_use]
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Handler {
            status,
            message: message.into(),
            payload: None,
        }
    }

    /// Creates a handler error carrying a structured payload.
    #[must_use]
    pub fn handler_with_payload(
        status: StatusCode,
        message: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self::Handler {
            status,
            message: message.into(),
            payload: Some(payload),
        }
    }

    /// Wraps any error as unexpected.
    pub fn unexpected(source: impl Into<anyhow::Error>) -> Self {
        Self::Unexpected {
            source: source.into(),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::RouteNotFound { .. } => ErrorKind::RouteNotFound,
            Self::Route(RouteError::Duplicate { .. }) => ErrorKind::DuplicateRoute,
            Self::Route(RouteError::InvalidPattern { .. }) => ErrorKind::InvalidRoute,
            Self::Route(RouteError::Ambiguous { .. }) => ErrorKind::AmbiguousRoute,
            Self::Route(RouteError::MalformedPath { .. }) | Self::BadRequest { .. } => {
                ErrorKind::BadRequest
            }
            Self::RequestTimeout => ErrorKind::RequestTimeout,
            Self::AuthenticationMissing => ErrorKind::AuthenticationMissing,
            Self::AuthenticationExpired => ErrorKind::AuthenticationExpired,
            Self::AuthenticationRefused { .. } => ErrorKind::AuthenticationRefused,
            Self::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
            Self::Handler { .. } => ErrorKind::Handler,
            Self::Unexpected { .. } => ErrorKind::Unexpected,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::AuthenticationMissing
            | Self::AuthenticationExpired
            | Self::AuthenticationRefused { .. }
            | Self::AuthorizationDenied { .. } => StatusCode::FORBIDDEN,
            Self::BadRequest { .. } | Self::Route(RouteError::MalformedPath { .. }) => {
                StatusCode::BAD_REQUEST
            }
            Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            Self::Handler { status, .. } => *status,
            Self::Route(_) | Self::Unexpected { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message that may be shown to clients.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::RouteNotFound { .. } => "Route not found".to_string(),
            Self::AuthenticationMissing => "Not connected".to_string(),
            Self::AuthenticationExpired => "Session expired".to_string(),
            Self::AuthenticationRefused { .. } => "Authentication refused".to_string(),
            Self::AuthorizationDenied { .. } => "Not authorized".to_string(),
            Self::Route(RouteError::MalformedPath { .. }) => "Malformed request path".to_string(),
            Self::RequestTimeout => "Request body timed out".to_string(),
            Self::BadRequest { message } | Self::Handler { message, .. } => message.clone(),
            Self::Route(_) | Self::Unexpected { .. } => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    /// Returns true when the error reflects a server fault rather than the
    /// request.
    #[must_use]
    pub fn is_server_fault(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        let details = match self {
            Self::Handler { payload, .. } => payload.clone(),
            _ => None,
        };
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.kind().code().to_string(),
                message: self.client_message(),
                details,
            },
            request_id: request_id.map(ToString::to_string),
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Client-safe message.
    pub message: String,
    /// Handler-supplied payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_authentication_errors_are_forbidden() {
        let errors = [
            CitadelError::AuthenticationMissing,
            CitadelError::AuthenticationExpired,
            CitadelError::refused("bad signature"),
            CitadelError::denied(["ADMIN"]),
        ];
        for error in errors {
            assert_eq!(error.status_code(), StatusCode::FORBIDDEN, "{error:?}");
        }
    }

    #[test]
    fn test_client_messages() {
        assert_eq!(CitadelError::AuthenticationMissing.client_message(), "Not connected");
        assert_eq!(CitadelError::AuthenticationExpired.client_message(), "Session expired");
        assert_eq!(
            CitadelError::refused("issuer mismatch").client_message(),
            "Authentication refused"
        );
        assert_eq!(CitadelError::denied(["ADMIN"]).client_message(), "Not authorized");
        assert_eq!(
            CitadelError::route_not_found("GET", "/x").client_message(),
            "Route not found"
        );
    }

    #[test]
    fn test_unexpected_error_is_opaque() {
        let error = CitadelError::unexpected(anyhow::anyhow!("db password is hunter2"));
        assert_eq!(error.kind(), ErrorKind::Unexpected);
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().contains("hunter2"));

        let json = serde_json::to_string(&error.to_envelope(Some("req-1"))).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains(INTERNAL_ERROR_MESSAGE));
        assert!(json.contains("\"code\":\"UNEXPECTED_ERROR\""));
    }

    #[test]
    fn test_ambiguous_route_is_opaque() {
        let error = CitadelError::from(RouteError::Ambiguous {
            method: Method::GET,
            path: "/games/1".to_string(),
            candidates: vec!["/games/:a".to_string(), "/games/:b".to_string()],
        });
        assert_eq!(error.kind(), ErrorKind::AmbiguousRoute);
        assert!(error.is_server_fault());

        let envelope = error.to_envelope(None);
        assert_eq!(envelope.error.message, INTERNAL_ERROR_MESSAGE);
        assert!(envelope.request_id.is_none());
    }

    #[test]
    fn test_handler_error_keeps_status_and_payload() {
        let error = CitadelError::handler_with_payload(
            StatusCode::CONFLICT,
            "Unit already moved this turn",
            serde_json::json!({ "unit": "u7" }),
        );
        assert_eq!(error.status_code(), StatusCode::CONFLICT);

        let envelope = error.to_envelope(Some("req-9"));
        assert_eq!(envelope.error.code, "HANDLER_ERROR");
        assert_eq!(envelope.error.message, "Unit already moved this turn");
        assert_eq!(envelope.error.details.unwrap()["unit"], "u7");
        assert_eq!(envelope.request_id.as_deref(), Some("req-9"));
    }

    #[test]
    fn test_bad_request() {
        let error = CitadelError::bad_request("expected value at line 1 column 1");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(error.kind().code(), "BAD_REQUEST");
    }

    #[test]
    fn test_malformed_path_is_bad_request() {
        let error = CitadelError::from(RouteError::MalformedPath {
            path: "/games/%FF".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
        assert!(!error.is_server_fault());
        assert_eq!(error.client_message(), "Malformed request path");
    }

    #[test]
    fn test_request_timeout_has_own_code() {
        let error = CitadelError::RequestTimeout;
        assert_eq!(error.status_code(), StatusCode::REQUEST_TIMEOUT);

        let envelope = error.to_envelope(Some("req-3"));
        assert_eq!(envelope.error.code, "REQUEST_TIMEOUT");
        assert_eq!(envelope.error.message, "Request body timed out");
    }

    #[test]
    fn test_duplicate_route_kind() {
        let error = CitadelError::from(RouteError::Duplicate {
            method: Method::POST,
            pattern: "/articles".to_string(),
        });
        assert_eq!(error.kind(), ErrorKind::DuplicateRoute);
        assert!(error.to_string().contains("/articles"));
    }
}
