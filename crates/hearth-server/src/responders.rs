//! Catch-all responders mounted after every route.

use std::sync::Arc;

use hearth_core::{HearthError, RequestContext, Response, ResponseExt};
use tracing::{debug, error};

/// Renders a request that matched no route.
pub type NotFoundResponder = Arc<dyn Fn(&RequestContext) -> Response + Send + Sync>;

/// Renders an error that escaped a route's chain.
pub type ErrorResponder = Arc<dyn Fn(&RequestContext, &HearthError) -> Response + Send + Sync>;

/// Returns the standard 404 responder (`ROUTE_NOT_FOUND`).
#[must_use]
pub fn not_found() -> NotFoundResponder {
    Arc::new(|ctx| {
        debug!(method = %ctx.method(), path = ctx.path(), "no route matched");
        Response::from_error(&HearthError::route_not_found(format!(
            "Route not found: {} {}",
            ctx.method(),
            ctx.path()
        )))
    })
}

/// Returns the standard error responder.
///
/// Deliberate errors are rendered as raised. Internal errors become a
/// generic 500 and their detail goes to the log only.
#[must_use]
pub fn internal_error() -> ErrorResponder {
    Arc::new(|ctx, err| {
        if err.is_internal() {
            error!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = ctx.path(),
                error = ?err,
                "unhandled error"
            );
        }
        Response::from_error(err)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let ctx = RequestContext::new(Method::GET, "/nowhere");
        let response = not_found()(&ctx);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body(response).await;
        assert_eq!(body["error"], true);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");
        assert_eq!(body["message"], "Route not found: GET /nowhere");
    }

    #[tokio::test]
    async fn test_internal_detail_is_hidden() {
        let ctx = RequestContext::new(Method::POST, "/albums");
        let err = HearthError::internal("database password rejected");
        let response = internal_error()(&ctx, &err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body(response).await;
        assert_eq!(body["message"], "Internal server error");
        assert_eq!(body["code"], "UNKNOWN_ERROR");
    }

    #[tokio::test]
    async fn test_deliberate_error_is_rendered_as_raised() {
        let ctx = RequestContext::new(Method::GET, "/albums/1");
        let err = HearthError::http(StatusCode::CONFLICT, "Album is locked").with_code("ALBUM_LOCKED");
        let response = internal_error()(&ctx, &err);
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = body(response).await;
        assert_eq!(body["message"], "Album is locked");
        assert_eq!(body["code"], "ALBUM_LOCKED");
    }
}
