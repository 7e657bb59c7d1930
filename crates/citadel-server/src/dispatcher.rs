//! Request dispatch.
//!
//! The [`Dispatcher`] owns the route table and the handler registry. For each
//! request it:
//!
//! 1. resolves the route (404 when none, 400 when the path does not decode,
//!    opaque 500 when ambiguous)
//! 2. merges path, query and form parameters
//! 3. acquires the [`RequestScope`]
//! 4. invokes the handler with the context, the parameters and, for payload
//!    routes, the JSON body
//! 5. releases the scope, even if the handler failed or panicked
//! 6. writes the result as JSON or as a binary stream
//!
//! Cookies queued on the [`RequestContext`] during the call are appended to
//! every response, error responses included.
//!
//! # Example
//!
//! ```rust
//! use bytes::Bytes;
//! use citadel_core::CitadelError;
//! use citadel_router::Route;
//! use citadel_server::{Dispatcher, HandlerRegistry, Parameters};
//! use http::{Method, Request, StatusCode};
//! use serde_json::{json, Value};
//!
//! # tokio_test::block_on(async {
//! let mut handlers = HandlerRegistry::new();
//! handlers.payload("getGame", |_ctx, params: Parameters, _body: Value| async move {
//!     Ok::<_, CitadelError>(json!({ "id": params.require("id")? }))
//! });
//!
//! let dispatcher = Dispatcher::builder()
//!     .route(Method::GET, "/games/:id", Route::payload("getGame"))
//!     .unwrap()
//!     .handlers(handlers)
//!     .build()
//!     .unwrap();
//!
//! let request = Request::get("/games/42").body(Bytes::new()).unwrap();
//! let response = dispatcher.dispatch(request).await;
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.body().as_ref(), br#"{"id":"42"}"#);
//! # });
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use bytes::Bytes;
use citadel_core::{CitadelError, CitadelResult, RequestContext};
use citadel_router::{ExecutionMode, Route, RouteError, RouteTable};
use citadel_telemetry::metrics::UNMATCHED_ROUTE;
use citadel_telemetry::{record_auth_failure, record_request, InFlightGuard};
use futures_util::FutureExt;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response, StatusCode};
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::error::ServerError;
use crate::form::{merge, parse_form, parse_query};
use crate::handler::{ErasedHandler, HandlerRegistry, StreamReply};
use crate::response::{self, error_response};
use crate::scope::{NoopScope, RequestScope, ScopeGuard};

/// Routes requests to handlers.
///
/// Built once at startup and shared behind an `Arc`; dispatching only needs
/// `&self`.
pub struct Dispatcher {
    routes: RouteTable,
    handlers: HandlerRegistry,
    scope: Arc<dyn RequestScope>,
}

impl Dispatcher {
    /// Creates a builder.
    #[must_use]
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Returns the route table.
    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Returns the handler registry.
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Dispatches one request. Never fails: every error becomes a response.
    pub async fn dispatch(&self, request: Request<Bytes>) -> Response<Bytes> {
        let (parts, body) = request.into_parts();
        let ctx = RequestContext::from_parts(parts.method, parts.uri.path(), parts.headers);
        let query = parts.uri.query();

        let span = info_span!(
            "request",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
        );

        async {
            let _in_flight = InFlightGuard::new();
            let mut route_label = UNMATCHED_ROUTE.to_string();

            let mut response = match self.handle(&ctx, query, body, &mut route_label).await {
                Ok(response) => response,
                Err(err) => {
                    log_failure(&err);
                    error_response(&err, Some(&ctx.request_id().to_string()))
                }
            };

            response::append_cookies(&mut response, &ctx);

            let status = response.status();
            record_request(&route_label, status.as_u16(), ctx.elapsed());
            debug!(status = status.as_u16(), elapsed_ms = ctx.elapsed().as_millis() as u64, "request completed");

            response
        }
        .instrument(span)
        .await
    }

    async fn handle(
        &self,
        ctx: &RequestContext,
        query: Option<&str>,
        body: Bytes,
        route_label: &mut String,
    ) -> CitadelResult<Response<Bytes>> {
        let found = self
            .routes
            .resolve(ctx.method(), ctx.path())?
            .ok_or_else(|| CitadelError::route_not_found(ctx.method().as_str(), ctx.path()))?;

        route_label.clear();
        route_label.push_str(found.pattern);
        debug!(route = found.pattern, handler = found.route.handler(), "route resolved");

        let handler = self.handlers.get(found.route.handler()).ok_or_else(|| {
            CitadelError::unexpected(anyhow::anyhow!(
                "no handler registered for '{}'",
                found.route.handler()
            ))
        })?;

        let form = parse_form(ctx.header(CONTENT_TYPE.as_str()), &body).await?;
        let is_form = form.is_some();
        let params = merge(&found.params, parse_query(query)?, form);

        match (found.route.mode(), handler) {
            (ExecutionMode::PayloadExchange, ErasedHandler::Payload(invoke)) => {
                let input = if is_form { Value::Null } else { parse_json(&body)? };

                let _scope = ScopeGuard::acquire(self.scope.as_ref(), ctx);
                let value = guard_panics(invoke(ctx.clone(), params, input)).await?;

                Ok(response::json(StatusCode::OK, &value))
            }
            (ExecutionMode::BinaryStream(disposition), ErasedHandler::Stream(invoke)) => {
                let _scope = ScopeGuard::acquire(self.scope.as_ref(), ctx);
                let reply = guard_panics(invoke(ctx.clone(), params)).await?;
                let content_type = reply.content_type().to_string();
                // Attachments always carry a name; the handler id stands in.
                let file_name = reply.name().unwrap_or(found.route.handler()).to_string();
                let data = read_stream(reply).await?;

                response::binary(&content_type, &file_name, disposition, data)
            }
            (mode, handler) => Err(CitadelError::unexpected(anyhow::anyhow!(
                "route {} is {:?} but handler '{}' is a {} handler",
                found.pattern,
                mode,
                found.route.handler(),
                handler.kind()
            ))),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes.len())
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

/// Assembles a [`Dispatcher`].
#[derive(Default)]
pub struct DispatcherBuilder {
    routes: RouteTable,
    handlers: HandlerRegistry,
    scope: Option<Arc<dyn RequestScope>>,
}

impl DispatcherBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError::Duplicate` if the method and pattern are already
    /// registered, `RouteError::InvalidPattern` for a nameless capture.
    pub fn route(mut self, method: Method, pattern: &str, route: Route) -> Result<Self, RouteError> {
        self.routes.register(method, pattern, route)?;
        Ok(self)
    }

    /// Replaces the route table.
    #[must_use]
    pub fn routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Replaces the handler registry.
    #[must_use]
    pub fn handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    /// Sets the request scope. Defaults to [`NoopScope`].
    #[must_use]
    pub fn scope(mut self, scope: impl RequestScope) -> Self {
        self.scope = Some(Arc::new(scope));
        self
    }

    /// Checks that every route has a handler of the right kind.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::MissingHandler` or `ServerError::HandlerMismatch`
    /// for the first offending route.
    pub fn build(self) -> Result<Dispatcher, ServerError> {
        for (method, pattern, route) in self.routes.routes() {
            let handler = self.handlers.get(route.handler()).ok_or_else(|| {
                ServerError::MissingHandler {
                    method: method.to_string(),
                    pattern: pattern.to_string(),
                    handler: route.handler().to_string(),
                }
            })?;

            let expected = if route.mode().is_stream() { "stream" } else { "payload" };
            if handler.kind() != expected {
                return Err(ServerError::HandlerMismatch {
                    method: method.to_string(),
                    pattern: pattern.to_string(),
                    handler: route.handler().to_string(),
                    expected,
                });
            }

            debug!(%method, pattern, handler = route.handler(), "route bound");
        }

        info!(
            routes = self.routes.len(),
            handlers = self.handlers.len(),
            "dispatcher ready"
        );

        Ok(Dispatcher {
            routes: self.routes,
            handlers: self.handlers,
            scope: self.scope.unwrap_or_else(|| Arc::new(NoopScope)),
        })
    }
}

/// Parses a JSON body; empty or whitespace-only bodies read as `null`.
fn parse_json(body: &Bytes) -> CitadelResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
        .map_err(|e| CitadelError::bad_request(format!("malformed JSON body: {e}")))
}

/// Turns a handler panic into an unexpected error.
async fn guard_panics<T>(
    invocation: impl std::future::Future<Output = CitadelResult<T>>,
) -> CitadelResult<T> {
    match AssertUnwindSafe(invocation).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Err(CitadelError::unexpected(anyhow::anyhow!(
                "handler panicked: {message}"
            )))
        }
    }
}

async fn read_stream(reply: StreamReply) -> CitadelResult<Vec<u8>> {
    let mut data = Vec::new();
    reply
        .into_reader()
        .read_to_end(&mut data)
        .await
        .map_err(CitadelError::unexpected)?;
    Ok(data)
}

fn log_failure(err: &CitadelError) {
    match err {
        CitadelError::AuthenticationMissing => record_auth_failure("missing"),
        CitadelError::AuthenticationExpired => record_auth_failure("expired"),
        CitadelError::AuthenticationRefused { reason } => record_auth_failure(reason),
        CitadelError::AuthorizationDenied { .. } => record_auth_failure("denied"),
        _ => {}
    }

    if err.is_server_fault() {
        error!(error = %err, code = err.kind().code(), "request failed");
    } else if err.status_code() == StatusCode::FORBIDDEN {
        warn!(error = %err, code = err.kind().code(), "request rejected");
    } else {
        debug!(error = %err, code = err.kind().code(), "request rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use citadel_core::{SetCookie, INTERNAL_ERROR_MESSAGE};
    use citadel_router::Disposition;
    use http::header::{CONTENT_DISPOSITION, SET_COOKIE};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::params::Parameters;

    #[derive(Default)]
    struct Counting {
        acquired: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    impl RequestScope for Counting {
        fn acquire(&self, _ctx: &RequestContext) {
            self.acquired.fetch_add(1, Ordering::SeqCst);
        }

        fn release(&self, _ctx: &RequestContext) {
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn handlers() -> HandlerRegistry {
        let mut handlers = HandlerRegistry::new();
        handlers
            .payload("echoParams", |_ctx, params: Parameters, body: Value| async move {
                let mut out = serde_json::Map::new();
                for (name, value) in params.iter() {
                    if let crate::params::ParamValue::Text(text) = value {
                        out.insert(name.to_string(), json!(text));
                    }
                }
                out.insert("files".to_string(), json!(params.files().len()));
                out.insert("body".to_string(), body);
                Ok::<_, CitadelError>(Value::Object(out))
            })
            .payload("rejectMove", |ctx: RequestContext, _params, _body: Value| async move {
                ctx.set_cookie(SetCookie::new("jwt", "refreshed").path("/"));
                Err::<Value, _>(CitadelError::handler_with_payload(
                    StatusCode::CONFLICT,
                    "Hex occupied",
                    json!({ "hex": "b4" }),
                ))
            })
            .payload("explode", |_ctx, _params, _body: Value| async move {
                Err::<Value, _>(CitadelError::unexpected(anyhow::anyhow!("connection pool exhausted")))
            })
            .payload("panics", |_ctx, _params, _body: Value| async move {
                if true {
                    panic!("unit table corrupted");
                }
                Ok::<Value, CitadelError>(Value::Null)
            })
            .stream("scenarioFile", |_ctx, params: Parameters| async move {
                let id = params.require("id")?.to_string();
                Ok::<_, CitadelError>(
                    StreamReply::from_bytes("application/xml", b"<scenario/>".to_vec())
                        .file_name(format!("{id}.xml")),
                )
            })
            .stream("exportScenario", |_ctx, _params: Parameters| async move {
                Ok::<_, CitadelError>(StreamReply::from_bytes("application/zip", b"PK".to_vec()))
            });
        handlers
    }

    fn dispatcher(scope: Counting) -> Dispatcher {
        Dispatcher::builder()
            .route(Method::GET, "/games/:id", Route::payload("echoParams"))
            .unwrap()
            .route(Method::POST, "/games/:id", Route::payload("echoParams"))
            .unwrap()
            .route(
                Method::GET,
                "/scenarios/:id/export",
                Route::stream("exportScenario", Disposition::Attachment),
            )
            .unwrap()
            .route(Method::GET, "/boards/:a", Route::payload("echoParams"))
            .unwrap()
            .route(Method::GET, "/boards/:b", Route::payload("echoParams"))
            .unwrap()
            .route(Method::POST, "/moves", Route::payload("rejectMove"))
            .unwrap()
            .route(Method::GET, "/explode", Route::payload("explode"))
            .unwrap()
            .route(Method::GET, "/panic", Route::payload("panics"))
            .unwrap()
            .route(
                Method::GET,
                "/scenarios/:id/file",
                Route::stream("scenarioFile", Disposition::Attachment),
            )
            .unwrap()
            .handlers(handlers())
            .scope(scope)
            .build()
            .unwrap()
    }

    fn body_json(response: &Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    fn get(uri: &str) -> Request<Bytes> {
        Request::get(uri).body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let dispatcher = dispatcher(Counting::default());
        let response = dispatcher.dispatch(get("/forums")).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(&response);
        assert_eq!(body["error"]["code"], "ROUTE_NOT_FOUND");
        assert_eq!(body["error"]["message"], "Route not found");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_query_overrides_path() {
        let dispatcher = dispatcher(Counting::default());
        let response = dispatcher.dispatch(get("/GAMES/42?id=43&turn=7")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(&response);
        assert_eq!(body["id"], "43");
        assert_eq!(body["turn"], "7");
        assert_eq!(body["body"], Value::Null);
    }

    #[tokio::test]
    async fn test_form_overrides_query_and_reads_null_body() {
        let dispatcher = dispatcher(Counting::default());
        let request = Request::post("/games/42?side=Axis")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Bytes::from_static(b"side=Allies&name=Kursk"))
            .unwrap();

        let body = body_json(&dispatcher.dispatch(request).await);
        assert_eq!(body["id"], "42");
        assert_eq!(body["side"], "Allies");
        assert_eq!(body["name"], "Kursk");
        assert_eq!(body["body"], Value::Null);
    }

    #[tokio::test]
    async fn test_multipart_files_attached() {
        let dispatcher = dispatcher(Counting::default());
        let payload = "--B\r\n\
             Content-Disposition: form-data; name=\"title\"\r\n\r\n\
             Bulge\r\n\
             --B\r\n\
             Content-Disposition: form-data; name=\"scenario\"; filename=\"bulge.xml\"\r\n\
             Content-Type: application/xml\r\n\r\n\
             <scenario/>\r\n\
             --B--\r\n";
        let request = Request::post("/games/1")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=B")
            .body(Bytes::from(payload))
            .unwrap();

        let body = body_json(&dispatcher.dispatch(request).await);
        assert_eq!(body["title"], "Bulge");
        assert_eq!(body["files"], 1);
    }

    #[tokio::test]
    async fn test_json_body_passed_through() {
        let dispatcher = dispatcher(Counting::default());
        let request = Request::post("/games/42")
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from_static(br#"{"unit":"7th","hex":"b4"}"#))
            .unwrap();

        let body = body_json(&dispatcher.dispatch(request).await);
        assert_eq!(body["body"], json!({"unit": "7th", "hex": "b4"}));
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let dispatcher = dispatcher(Counting::default());
        let request = Request::post("/games/42")
            .header(CONTENT_TYPE, "application/json")
            .body(Bytes::from_static(b"{not json"))
            .unwrap();

        let response = dispatcher.dispatch(request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&response)["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_ambiguous_route_is_opaque_500() {
        let dispatcher = dispatcher(Counting::default());
        let response = dispatcher.dispatch(get("/boards/7")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(&response);
        assert_eq!(body["error"]["message"], INTERNAL_ERROR_MESSAGE);
        assert!(!String::from_utf8_lossy(response.body()).contains("/boards"));
    }

    #[tokio::test]
    async fn test_handler_error_keeps_status_payload_and_cookies() {
        let dispatcher = dispatcher(Counting::default());
        let request = Request::post("/moves").body(Bytes::new()).unwrap();
        let response = dispatcher.dispatch(request).await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(&response);
        assert_eq!(body["error"]["message"], "Hex occupied");
        assert_eq!(body["error"]["details"], json!({"hex": "b4"}));

        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.starts_with("jwt=refreshed"));
    }

    #[tokio::test]
    async fn test_unexpected_error_is_opaque_and_scope_released() {
        let scope = Counting::default();
        let released = Arc::clone(&scope.released);
        let dispatcher = dispatcher(scope);

        let response = dispatcher.dispatch(get("/explode")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&response)["error"]["message"], INTERNAL_ERROR_MESSAGE);
        assert!(!String::from_utf8_lossy(response.body()).contains("pool"));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_handler_releases_scope() {
        let scope = Counting::default();
        let acquired = Arc::clone(&scope.acquired);
        let released = Arc::clone(&scope.released);
        let dispatcher = dispatcher(scope);

        let response = dispatcher.dispatch(get("/panic")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(acquired.load(Ordering::SeqCst), 1);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scope_not_acquired_without_route() {
        let scope = Counting::default();
        let acquired = Arc::clone(&scope.acquired);
        let dispatcher = dispatcher(scope);

        dispatcher.dispatch(get("/nowhere")).await;
        assert_eq!(acquired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stream_route_attachment() {
        let dispatcher = dispatcher(Counting::default());
        let response = dispatcher.dispatch(get("/scenarios/kursk/file")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/xml");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"kursk.xml\""
        );
        assert_eq!(response.body().as_ref(), b"<scenario/>");
    }

    #[tokio::test]
    async fn test_unnamed_attachment_falls_back_to_handler_id() {
        let dispatcher = dispatcher(Counting::default());
        let response = dispatcher.dispatch(get("/scenarios/kursk/export")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"exportScenario\""
        );
        assert_eq!(response.body().as_ref(), b"PK");
    }

    #[tokio::test]
    async fn test_encoded_path_segments_are_decoded() {
        let dispatcher = dispatcher(Counting::default());
        let response = dispatcher.dispatch(get("/games/Bulge%20Ardennes")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(&response)["id"], "Bulge Ardennes");

        let response = dispatcher.dispatch(get("/g%61mes/7")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(&response)["id"], "7");
    }

    #[tokio::test]
    async fn test_undecodable_path_is_400() {
        let scope = Counting::default();
        let acquired = Arc::clone(&scope.acquired);
        let dispatcher = dispatcher(scope);

        let response = dispatcher.dispatch(get("/games/%FF")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(&response);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], "Malformed request path");
        assert_eq!(acquired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_build_rejects_missing_handler() {
        let result = Dispatcher::builder()
            .route(Method::GET, "/games", Route::payload("listGames"))
            .unwrap()
            .build();

        assert!(matches!(
            result,
            Err(ServerError::MissingHandler { ref handler, .. }) if handler == "listGames"
        ));
    }

    #[test]
    fn test_build_rejects_mode_mismatch() {
        let result = Dispatcher::builder()
            .route(
                Method::GET,
                "/games/:id/map",
                Route::stream("echoParams", Disposition::Inline),
            )
            .unwrap()
            .handlers(handlers())
            .build();

        assert!(matches!(
            result,
            Err(ServerError::HandlerMismatch { expected: "stream", .. })
        ));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let result = Dispatcher::builder()
            .route(Method::GET, "/games", Route::payload("a"))
            .unwrap()
            .route(Method::GET, "/Games/", Route::payload("b"));

        assert!(matches!(result, Err(RouteError::Duplicate { .. })));
    }

    #[test]
    fn test_request_metrics_labels() {
        let dispatcher = dispatcher(Counting::default());
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            tokio_test::block_on(async {
                dispatcher.dispatch(get("/games/1")).await;
                dispatcher.dispatch(get("/games/2")).await;
                dispatcher.dispatch(get("/unknown/path")).await;
            });
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"citadel_requests_total{route="/games/:id",status="200"} 2"#));
        assert!(rendered.contains(r#"citadel_requests_total{route="unmatched",status="404"} 1"#));
    }
}
