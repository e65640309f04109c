//! Request validation stage.
//!
//! Runs the route's declared rules through
//! [`evaluate_all`](hearth_core::validation::evaluate_all). The first failing
//! rule ends the request with a `VALIDATION_FAILED` error; the handler never
//! runs.

use std::sync::Arc;

use hearth_core::validation::{evaluate_all, Outcome};
use hearth_core::{BoxFuture, HandlerResult, HearthError, RequestContext, ValidationRule};
use hearth_telemetry::metrics;
use tracing::debug;

use crate::middleware::{Middleware, Next};

/// Middleware that enforces a route's validation rules.
#[derive(Clone)]
pub struct ValidationMiddleware {
    route: String,
    rules: Arc<[ValidationRule]>,
}

impl ValidationMiddleware {
    /// Creates the stage for a route and its rules, in declared order.
    #[must_use]
    pub fn new(route: impl Into<String>, rules: Vec<ValidationRule>) -> Self {
        Self {
            route: route.into(),
            rules: rules.into(),
        }
    }

    /// Returns the number of rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl std::fmt::Debug for ValidationMiddleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationMiddleware")
            .field("route", &self.route)
            .field("rules", &self.rules.iter().map(ValidationRule::kind).collect::<Vec<_>>())
            .finish()
    }
}

impl Middleware for ValidationMiddleware {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            match evaluate_all(&self.rules, ctx) {
                Outcome::Pass => next.run(ctx).await,
                Outcome::Fail(message) => {
                    debug!(
                        request_id = %ctx.request_id(),
                        route = %self.route,
                        reason = %message,
                        "request rejected"
                    );
                    metrics::record_validation_failure(&self.route);
                    Err(HearthError::validation(message))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{json_response, BodySchema, Handler};
    use http::{Method, StatusCode};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_handler(calls: &Arc<AtomicUsize>) -> Handler {
        let calls = Arc::clone(calls);
        Handler::new(move |_ctx| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { json_response(StatusCode::OK, &"ok") }
        })
    }

    async fn run(stage: &ValidationMiddleware, handler: &Handler, mut ctx: RequestContext) -> HandlerResult {
        Next::new(stage, Next::endpoint(handler)).run(&mut ctx).await
    }

    #[tokio::test]
    async fn test_passing_rules_reach_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stage = ValidationMiddleware::new(
            "/albums",
            vec![ValidationRule::header([("x-client", "Web")])],
        );

        let ctx = RequestContext::new(Method::GET, "/albums").with_header("X-Client", " web ");
        let response = run(&stage, &counting_handler(&calls), ctx).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_first_failure_wins() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stage = ValidationMiddleware::new(
            "/albums",
            vec![
                ValidationRule::body(
                    BodySchema::new()
                        .nested("release", BodySchema::new().field("year", serde_json::Value::is_number)),
                ),
                ValidationRule::query(["page"]),
            ],
        );

        let ctx = RequestContext::new(Method::POST, "/albums")
            .with_body(json!({ "release": { "year": "2020" } }));
        let err = run(&stage, &counting_handler(&calls), ctx).await.unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert_eq!(err.to_string(), "Invalid property \"release.year\" on body!");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_custom_rule() {
        let calls = Arc::new(AtomicUsize::new(0));
        let stage = ValidationMiddleware::new(
            "/admin",
            vec![ValidationRule::custom(|ctx: &RequestContext| ctx.query("token").is_some())],
        );
        assert_eq!(stage.rule_count(), 1);

        let err = run(&stage, &counting_handler(&calls), RequestContext::new(Method::GET, "/admin"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Request failed custom validation!");
    }
}
