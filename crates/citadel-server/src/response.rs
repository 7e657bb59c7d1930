//! Response construction.

use bytes::Bytes;
use citadel_core::{CitadelError, RequestContext};
use citadel_router::Disposition;
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE};
use http::{HeaderValue, Response, StatusCode};
use serde::Serialize;

const APPLICATION_JSON: &str = "application/json";

/// Builds a JSON response.
pub(crate) fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<Bytes> {
    match serde_json::to_vec(value) {
        Ok(body) => Response::builder()
            .status(status)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .body(Bytes::from(body))
            .unwrap_or_else(|_| fallback()),
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            fallback()
        }
    }
}

/// Builds the error envelope response for `err`.
///
/// Only the client message travels; the full error is logged by the caller.
pub fn error_response(err: &CitadelError, request_id: Option<&str>) -> Response<Bytes> {
    json(err.status_code(), &err.to_envelope(request_id))
}

/// Builds a binary response.
pub(crate) fn binary(
    content_type: &str,
    file_name: &str,
    disposition: Disposition,
    body: Vec<u8>,
) -> Result<Response<Bytes>, CitadelError> {
    let content_type = HeaderValue::from_str(content_type).map_err(CitadelError::unexpected)?;
    let disposition = HeaderValue::from_str(&content_disposition(disposition, file_name))
        .map_err(CitadelError::unexpected)?;

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, content_type)
        .header(CONTENT_DISPOSITION, disposition)
        .body(Bytes::from(body))
        .map_err(CitadelError::unexpected)
}

/// Renders a `Content-Disposition` value.
///
/// ```text
/// inline
/// attachment; filename="kursk.xml"
/// ```
pub(crate) fn content_disposition(disposition: Disposition, file_name: &str) -> String {
    match disposition {
        Disposition::Inline => "inline".to_string(),
        Disposition::Attachment => {
            format!("attachment; filename=\"{}\"", sanitize_file_name(file_name))
        }
    }
}

// Quoted-string safe and ASCII only.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect()
}

/// Appends the cookies queued on `ctx` as `Set-Cookie` headers.
pub(crate) fn append_cookies(response: &mut Response<Bytes>, ctx: &RequestContext) {
    for cookie in ctx.take_cookies() {
        match HeaderValue::from_str(&cookie.to_header_value()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(_) => tracing::warn!(cookie = cookie.name(), "dropping unencodable cookie"),
        }
    }
}

fn fallback() -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use citadel_core::{SetCookie, INTERNAL_ERROR_MESSAGE};

    #[test]
    fn test_content_disposition() {
        assert_eq!(content_disposition(Disposition::Inline, "map.png"), "inline");
        assert_eq!(
            content_disposition(Disposition::Attachment, "kursk.xml"),
            "attachment; filename=\"kursk.xml\""
        );
        assert_eq!(
            content_disposition(Disposition::Attachment, "bad\"name\u{e9}.txt"),
            "attachment; filename=\"bad_name_.txt\""
        );
    }

    #[test]
    fn test_error_response_is_opaque_for_unexpected() {
        let err = CitadelError::unexpected(anyhow::anyhow!("db password wrong"));
        let response = error_response(&err, Some("req-1"));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["error"]["message"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(body["request_id"], "req-1");
        assert!(!String::from_utf8_lossy(response.body()).contains("password"));
    }

    #[test]
    fn test_binary_response_headers() {
        let response = binary(
            "application/xml",
            "kursk.xml",
            Disposition::Attachment,
            b"<scenario/>".to_vec(),
        )
        .unwrap();

        assert_eq!(response.headers()[CONTENT_TYPE], "application/xml");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"kursk.xml\""
        );
        assert_eq!(response.body().as_ref(), b"<scenario/>");
    }

    #[test]
    fn test_binary_rejects_bad_content_type() {
        let err = binary("text/\nplain", "plain", Disposition::Inline, Vec::new()).unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_append_cookies() {
        let ctx = RequestContext::mock();
        ctx.set_cookie(SetCookie::new("jwt", "t").path("/"));
        ctx.set_cookie(SetCookie::new("xsrfToken", "n").path("/"));

        let mut response = json(StatusCode::OK, &serde_json::json!({}));
        append_cookies(&mut response, &ctx);

        let cookies: Vec<_> = response.headers().get_all(SET_COOKIE).iter().collect();
        assert_eq!(cookies.len(), 2);
        assert!(ctx.queued_cookies().is_empty());
    }
}
