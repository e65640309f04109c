//! Request logging stage.
//!
//! Emits one `info` event per request once the rest of the chain has
//! finished, and records the request counters and latency histogram from
//! [`hearth_telemetry::metrics`]. The metric `route` label is the route
//! pattern, not the concrete path.

use hearth_core::{BoxFuture, HandlerResult, RequestContext};
use hearth_telemetry::metrics;
use tracing::info;

use crate::middleware::{Middleware, Next};

/// Middleware that logs each completed request.
#[derive(Debug, Clone)]
pub struct RequestLogMiddleware {
    route: String,
}

impl RequestLogMiddleware {
    /// Creates the stage for a route pattern.
    #[must_use]
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
        }
    }

    /// Returns the route pattern used as the metrics label.
    #[must_use]
    pub fn route(&self) -> &str {
        &self.route
    }
}

impl Middleware for RequestLogMiddleware {
    fn name(&self) -> &'static str {
        "request_log"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let result = next.run(ctx).await;

            let status = match &result {
                Ok(response) => response.status(),
                Err(err) => err.status_code(),
            };
            let elapsed = ctx.elapsed();

            info!(
                request_id = %ctx.request_id(),
                method = %ctx.method(),
                path = ctx.path(),
                route = %self.route,
                status = status.as_u16(),
                duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "request completed"
            );
            metrics::record_request(ctx.method().as_str(), &self.route, status.as_u16(), elapsed);

            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{json_response, Handler, HearthError};
    use http::{Method, StatusCode};

    #[tokio::test]
    async fn test_passes_response_through() {
        let stage = RequestLogMiddleware::new("/albums");
        let handler = Handler::new(|_ctx| async { json_response(StatusCode::CREATED, &"made") });

        let mut ctx = RequestContext::new(Method::POST, "/albums");
        let response = Next::new(&stage, Next::endpoint(&handler))
            .run(&mut ctx)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_passes_error_through() {
        let stage = RequestLogMiddleware::new("/albums/{id}");
        let handler = Handler::new(|_ctx| async { Err(HearthError::not_found("no such album")) });

        let mut ctx = RequestContext::new(Method::GET, "/albums/9");
        let err = Next::new(&stage, Next::endpoint(&handler))
            .run(&mut ctx)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(stage.route(), "/albums/{id}");
    }
}
