//! Response types shared by handlers and middleware.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;

use crate::{HearthError, HearthResult};

/// The HTTP response type produced by handlers.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a handler or middleware step resolves to.
pub type HandlerResult = HearthResult<Response>;

const APPLICATION_JSON: &str = "application/json";

// Sent if an envelope ever fails to serialize.
const FALLBACK_ENVELOPE: &[u8] =
    br#"{"error":true,"message":"Internal server error","code":"UNKNOWN_ERROR"}"#;

/// Builds a JSON response from any serializable value.
///
/// # Errors
///
/// Returns an internal error if `value` fails to serialize.
///
/// # Example
///
/// ```
/// use hearth_core::json_response;
/// use http::StatusCode;
///
/// let response = json_response(StatusCode::CREATED, &serde_json::json!({ "id": 7 })).unwrap();
/// assert_eq!(response.status(), StatusCode::CREATED);
/// ```
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> HandlerResult {
    let body = serde_json::to_vec(value)
        .map_err(|e| HearthError::internal_with_source("failed to serialize response", e))?;
    Ok(Response::with_body(status, APPLICATION_JSON, Bytes::from(body)))
}

/// Extension trait for building responses.
pub trait ResponseExt {
    /// Creates a response with a body and content type.
    fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response;

    /// Creates a plain-text response.
    fn text(status: StatusCode, body: impl Into<String>) -> Response;

    /// Renders an error as its JSON envelope with the error's status.
    fn from_error(error: &HearthError) -> Response;
}

impl ResponseExt for Response {
    fn with_body(status: StatusCode, content_type: &'static str, body: Bytes) -> Response {
        let mut response = http::Response::new(Full::new(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }

    fn text(status: StatusCode, body: impl Into<String>) -> Response {
        Self::with_body(status, "text/plain; charset=utf-8", Bytes::from(body.into()))
    }

    fn from_error(error: &HearthError) -> Response {
        let body = serde_json::to_vec(&error.to_envelope())
            .map_or_else(|_| Bytes::from_static(FALLBACK_ENVELOPE), Bytes::from);
        Self::with_body(error.status_code(), APPLICATION_JSON, body)
    }
}
