//! Handler registration.
//!
//! Routes name their handler by identifier; the [`HandlerRegistry`] maps each
//! identifier to a typed async closure. Two shapes exist, one per execution
//! mode:
//!
//! - **payload**: `(RequestContext, Parameters, Req) -> Result<Res, CitadelError>`
//!   where `Req: DeserializeOwned` is read from the JSON body and `Res:
//!   Serialize` is written back as JSON
//! - **stream**: `(RequestContext, Parameters) -> Result<StreamReply, CitadelError>`
//!
//! # Example
//!
//! ```rust
//! use citadel_core::{CitadelError, RequestContext};
//! use citadel_server::{HandlerRegistry, Parameters, StreamReply};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Deserialize)]
//! struct NewPost {
//!     text: String,
//! }
//!
//! #[derive(Serialize)]
//! struct Post {
//!     thread: String,
//!     text: String,
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.payload("addPost", |_ctx: RequestContext, params: Parameters, body: NewPost| async move {
//!     Ok::<_, CitadelError>(Post {
//!         thread: params.require("thread")?.to_string(),
//!         text: body.text,
//!     })
//! });
//! registry.stream("mapImage", |_ctx, _params| async move {
//!     Ok(StreamReply::from_bytes("image/png", vec![0x89, b'P', b'N', b'G']))
//! });
//!
//! assert_eq!(registry.len(), 2);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::io::Cursor;
use std::pin::Pin;
use std::sync::Arc;

use citadel_core::{CitadelError, CitadelResult, RequestContext};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::io::AsyncRead;

use crate::params::Parameters;

/// Boxed future returned by erased handlers.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

type PayloadFn =
    Arc<dyn Fn(RequestContext, Parameters, Value) -> BoxFuture<CitadelResult<Value>> + Send + Sync>;

type StreamFn =
    Arc<dyn Fn(RequestContext, Parameters) -> BoxFuture<CitadelResult<StreamReply>> + Send + Sync>;

/// A binary response produced by a stream handler.
pub struct StreamReply {
    content_type: String,
    file_name: Option<String>,
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl StreamReply {
    /// Creates a reply reading from `reader`.
    pub fn new(content_type: impl Into<String>, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            content_type: content_type.into(),
            file_name: None,
            reader: Box::new(reader),
        }
    }

    /// Creates a reply from bytes already in memory.
    pub fn from_bytes(content_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self::new(content_type, Cursor::new(data.into()))
    }

    /// Sets the file name offered for attachments.
    #[must_use]
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Returns the content type.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the file name, if any.
    pub fn name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub(crate) fn into_reader(self) -> Box<dyn AsyncRead + Send + Unpin> {
        self.reader
    }
}

impl fmt::Debug for StreamReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamReply")
            .field("content_type", &self.content_type)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// A registered handler.
#[derive(Clone)]
pub(crate) enum ErasedHandler {
    Payload(PayloadFn),
    Stream(StreamFn),
}

impl ErasedHandler {
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Payload(_) => "payload",
            Self::Stream(_) => "stream",
        }
    }
}

/// Handler identifiers mapped to handlers.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, ErasedHandler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload-exchange handler, replacing any handler with the
    /// same identifier.
    ///
    /// The JSON body is deserialized into `Req` (an empty or form body reads
    /// as `null`, so use `serde_json::Value`, `Option<T>` or `()` for routes
    /// without a body). A body that does not fit `Req` answers 400.
    pub fn payload<Req, Res, F, Fut>(&mut self, id: impl Into<String>, handler: F) -> &mut Self
    where
        Req: DeserializeOwned + Send + 'static,
        Res: Serialize + Send + 'static,
        F: Fn(RequestContext, Parameters, Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Res, CitadelError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: PayloadFn = Arc::new(move |ctx: RequestContext, params: Parameters, body: Value| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let request: Req = serde_json::from_value(body)
                    .map_err(|e| CitadelError::bad_request(format!("invalid request body: {e}")))?;

                let response = handler(ctx, params, request).await?;

                serde_json::to_value(response).map_err(CitadelError::unexpected)
            })
        });

        self.handlers.insert(id.into(), ErasedHandler::Payload(erased));
        self
    }

    /// Registers a binary-stream handler, replacing any handler with the
    /// same identifier.
    pub fn stream<F, Fut>(&mut self, id: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(RequestContext, Parameters) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<StreamReply, CitadelError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let erased: StreamFn = Arc::new(move |ctx: RequestContext, params: Parameters| {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler(ctx, params).await })
        });

        self.handlers.insert(id.into(), ErasedHandler::Stream(erased));
        self
    }

    pub(crate) fn get(&self, id: &str) -> Option<&ErasedHandler> {
        self.handlers.get(id)
    }

    /// Returns true if `id` is registered.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.handlers.contains_key(id)
    }

    /// Returns the number of handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Returns the registered identifiers, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<_> = self.handlers.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.ids())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde::Deserialize;
    use tokio::io::AsyncReadExt;

    #[derive(Deserialize)]
    struct Move {
        hex: String,
    }

    #[derive(Serialize)]
    struct Moved {
        unit: String,
        hex: String,
    }

    fn registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.payload("moveUnit", |_ctx, params: Parameters, body: Move| async move {
            Ok::<_, CitadelError>(Moved {
                unit: params.require("unit")?.to_string(),
                hex: body.hex,
            })
        });
        registry
    }

    async fn call_payload(
        registry: &HandlerRegistry,
        id: &str,
        params: Parameters,
        body: Value,
    ) -> CitadelResult<Value> {
        match registry.get(id) {
            Some(ErasedHandler::Payload(f)) => f(RequestContext::mock(), params, body).await,
            _ => panic!("no payload handler {id}"),
        }
    }

    #[tokio::test]
    async fn test_payload_round_trip() {
        let registry = registry();
        let mut params = Parameters::new();
        params.insert("unit", "7th-panzer");

        let value = call_payload(&registry, "moveUnit", params, serde_json::json!({"hex": "b4"}))
            .await
            .unwrap();

        assert_eq!(value, serde_json::json!({"unit": "7th-panzer", "hex": "b4"}));
    }

    #[tokio::test]
    async fn test_payload_body_mismatch_is_bad_request() {
        let registry = registry();
        let err = call_payload(&registry, "moveUnit", Parameters::new(), Value::Null)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_stream_reply_reads_bytes() {
        let mut registry = HandlerRegistry::new();
        registry.stream("download", |_ctx, _params| async {
            Ok(StreamReply::from_bytes("text/plain", "hello").file_name("hello.txt"))
        });

        let Some(ErasedHandler::Stream(f)) = registry.get("download") else {
            panic!("no stream handler");
        };
        let reply = f(RequestContext::mock(), Parameters::new()).await.unwrap();
        assert_eq!(reply.content_type(), "text/plain");
        assert_eq!(reply.name(), Some("hello.txt"));

        let mut data = Vec::new();
        reply.into_reader().read_to_end(&mut data).await.unwrap();
        assert_eq!(data, b"hello");
    }

    #[test]
    fn test_registry_bookkeeping() {
        let mut registry = registry();
        registry.stream("mapImage", |_ctx, _params| async {
            Ok(StreamReply::from_bytes("image/png", Vec::new()))
        });

        assert!(registry.contains("moveUnit"));
        assert!(!registry.contains("missing"));
        assert_eq!(registry.ids(), vec!["mapImage", "moveUnit"]);
        assert_eq!(registry.get("mapImage").map(ErasedHandler::kind), Some("stream"));
        assert!(format!("{registry:?}").contains("moveUnit"));
    }
}
