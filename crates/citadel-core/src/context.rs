//! Request context types.
//!
//! A [`RequestContext`] is built once per request by the dispatcher and
//! handed (by clone) to the authenticator and to handlers. Clones share one
//! outgoing cookie queue, so a cookie set by the authenticator inside a
//! handler still reaches the response.

use crate::cookie::{Cookies, SetCookie};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// # Example
///
/// ```
/// use citadel_core::RequestId;
///
/// let id = RequestId::new();
/// assert_eq!(id.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new time-ordered request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Per-request state shared by the dispatcher, authenticator and handlers.
///
/// # Example
///
/// ```
/// use citadel_core::{RequestContext, SetCookie};
/// use http::Method;
///
/// let ctx = RequestContext::new(Method::GET, "/games")
///     .with_header("XSRF-TOKEN", "n1")
///     .with_cookie("xsrfToken", "n1");
///
/// assert_eq!(ctx.header("xsrf-token"), Some("n1"));
/// assert_eq!(ctx.cookies().get("xsrfToken"), Some("n1"));
///
/// let handler_view = ctx.clone();
/// handler_view.set_cookie(SetCookie::remove("jwt"));
/// assert_eq!(ctx.take_cookies().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    headers: HeaderMap,
    cookies: Cookies,
    outgoing: Arc<Mutex<Vec<SetCookie>>>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context with no headers and a fresh request ID.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self::from_parts(method, path, HeaderMap::new())
    }

    /// Creates a context from request parts, parsing the `Cookie` headers.
    #[must_use]
    pub fn from_parts(method: Method, path: impl Into<String>, headers: HeaderMap) -> Self {
        let cookies = Cookies::from_headers(&headers);
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            headers,
            cookies,
            outgoing: Arc::default(),
            started_at: Instant::now(),
        }
    }

    /// Creates a `GET /` context for tests.
    #[must_use]
    pub fn mock() -> Self {
        Self::new(Method::GET, "/")
    }

    /// Adds a request header. Invalid names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Adds a request cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name, value);
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request path, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Cookies sent with the request.
    #[must_use]
    pub const fn cookies(&self) -> &Cookies {
        &self.cookies
    }

    /// Queues a cookie for the response, replacing any queued cookie with
    /// the same name.
    pub fn set_cookie(&self, cookie: SetCookie) {
        let mut outgoing = self.outgoing.lock();
        outgoing.retain(|queued| queued.name() != cookie.name());
        outgoing.push(cookie);
    }

    /// Returns a copy of the queued cookies.
    #[must_use]
    pub fn queued_cookies(&self) -> Vec<SetCookie> {
        self.outgoing.lock().clone()
    }

    /// Drains the queued cookies.
    #[must_use]
    pub fn take_cookies(&self) -> Vec<SetCookie> {
        std::mem::take(&mut *self.outgoing.lock())
    }

    /// Time since the context was created.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header;

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_request_id_serializes_as_string() {
        let id = RequestId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: RequestId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_from_parts_parses_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("jwt=t; xsrfToken=n"));
        headers.insert("XSRF-TOKEN", HeaderValue::from_static("n"));

        let ctx = RequestContext::from_parts(Method::POST, "/games", headers);
        assert_eq!(ctx.method(), &Method::POST);
        assert_eq!(ctx.path(), "/games");
        assert_eq!(ctx.cookies().get("jwt"), Some("t"));
        assert_eq!(ctx.header("xsrf-token"), Some("n"));
    }

    #[test]
    fn test_set_cookie_replaces_by_name() {
        let ctx = RequestContext::mock();
        ctx.set_cookie(SetCookie::new("jwt", "first"));
        ctx.set_cookie(SetCookie::new("xsrfToken", "n"));
        ctx.set_cookie(SetCookie::new("jwt", "second"));

        let queued = ctx.queued_cookies();
        assert_eq!(queued.len(), 2);
        assert_eq!(queued[1].name(), "jwt");
        assert_eq!(queued[1].value(), "second");
    }

    #[test]
    fn test_clones_share_outgoing_cookies() {
        let ctx = RequestContext::mock();
        let clone = ctx.clone();
        clone.set_cookie(SetCookie::remove("jwt"));

        let taken = ctx.take_cookies();
        assert_eq!(taken.len(), 1);
        assert!(clone.take_cookies().is_empty());
    }

    #[test]
    fn test_invalid_header_is_ignored() {
        let ctx = RequestContext::mock().with_header("bad header", "x");
        assert!(ctx.headers().is_empty());
    }

    #[test]
    fn test_elapsed_grows() {
        let ctx = RequestContext::mock();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(ctx.elapsed() >= std::time::Duration::from_millis(5));
    }
}
