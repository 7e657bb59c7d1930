//! Route bindings.
//!
//! A [`Route`] is what a path pattern resolves to: the identifier of the
//! handler to invoke and the way the dispatcher exchanges data with it.

/// How a binary response is presented to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    /// `Content-Disposition: inline`
    #[default]
    Inline,
    /// `Content-Disposition: attachment; filename="..."`
    Attachment,
}

/// Execution mode of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// JSON request body in, JSON value out.
    PayloadExchange,
    /// No body parsing; the handler produces a typed byte stream.
    BinaryStream(Disposition),
}

impl ExecutionMode {
    /// Returns `true` for [`ExecutionMode::BinaryStream`].
    #[must_use]
    pub const fn is_stream(&self) -> bool {
        matches!(self, Self::BinaryStream(_))
    }
}

/// A handler binding registered under a method and path pattern.
///
/// Routes are immutable once built.
///
/// # Example
///
/// ```rust
/// use citadel_router::{Disposition, ExecutionMode, Route};
///
/// let route = Route::stream("downloadScenario", Disposition::Attachment);
/// assert_eq!(route.handler(), "downloadScenario");
/// assert_eq!(route.mode(), ExecutionMode::BinaryStream(Disposition::Attachment));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    handler: String,
    mode: ExecutionMode,
}

impl Route {
    /// Creates a route with an explicit execution mode.
    #[must_use]
    pub fn new(handler: impl Into<String>, mode: ExecutionMode) -> Self {
        Self {
            handler: handler.into(),
            mode,
        }
    }

    /// Creates a payload-exchange route.
    #[must_use]
    pub fn payload(handler: impl Into<String>) -> Self {
        Self::new(handler, ExecutionMode::PayloadExchange)
    }

    /// Creates a binary-stream route.
    #[must_use]
    pub fn stream(handler: impl Into<String>, disposition: Disposition) -> Self {
        Self::new(handler, ExecutionMode::BinaryStream(disposition))
    }

    /// Returns the handler identifier.
    #[must_use]
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Returns the execution mode.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }
}
