//! Routing errors.

use http::Method;
use thiserror::Error;

/// Errors raised while building or querying a [`RouteTable`](crate::RouteTable).
///
/// A path that matches nothing is not an error: resolution returns `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The method and pattern were already bound.
    #[error("route {method} {pattern} is already registered")]
    Duplicate {
        /// HTTP method of the conflicting registration.
        method: Method,
        /// The pattern registered twice.
        pattern: String,
    },

    /// The pattern cannot be parsed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A path segment does not percent-decode to UTF-8.
    #[error("malformed request path '{path}'")]
    MalformedPath {
        /// The path as received.
        path: String,
    },

    /// Several capture branches terminate on the same concrete path.
    #[error("{method} {path} matches several routes: {}", candidates.join(", "))]
    Ambiguous {
        /// HTTP method of the request.
        method: Method,
        /// The concrete path being resolved.
        path: String,
        /// Patterns of the equally specific matches.
        candidates: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_display() {
        let err = RouteError::Duplicate {
            method: Method::GET,
            pattern: "/games/:id".to_string(),
        };
        assert_eq!(err.to_string(), "route GET /games/:id is already registered");
    }

    #[test]
    fn test_ambiguous_display() {
        let err = RouteError::Ambiguous {
            method: Method::GET,
            path: "/games/7".to_string(),
            candidates: vec!["/games/:id".to_string(), "/games/:slug".to_string()],
        };
        assert!(err.to_string().contains("/games/:id, /games/:slug"));
    }
}
