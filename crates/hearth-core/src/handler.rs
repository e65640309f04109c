//! Type-erased request handlers.
//!
//! A [`Handler`] is what a route's `handler` name resolves to. Most handlers
//! are methods on a router component; [`Handler::bind`] captures the router
//! instance so the method can reach state injected during startup.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::{BoxFuture, HandlerResult, RequestContext};

type HandlerFn = dyn Fn(RequestContext) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// A cloneable, type-erased async handler.
///
/// # Example
///
/// ```
/// use hearth_core::{json_response, Handler, HandlerResult, RequestContext};
/// use http::StatusCode;
/// use std::sync::Arc;
///
/// struct Albums {
///     label: String,
/// }
///
/// impl Albums {
///     async fn list(self: Arc<Self>, _ctx: RequestContext) -> HandlerResult {
///         json_response(StatusCode::OK, &serde_json::json!({ "label": self.label }))
///     }
/// }
///
/// let albums = Arc::new(Albums { label: "indie".to_string() });
/// let handler = Handler::bind(&albums, Albums::list);
/// # let _ = handler;
/// ```
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Wraps an async function.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |ctx| Box::pin(f(ctx))),
        }
    }

    /// Binds an async method to a shared receiver.
    pub fn bind<T, F, Fut>(receiver: &Arc<T>, method: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(Arc<T>, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let receiver = Arc::clone(receiver);
        Self::new(move |ctx| method(Arc::clone(&receiver), ctx))
    }

    /// Invokes the handler.
    pub fn call(&self, ctx: RequestContext) -> BoxFuture<'static, HandlerResult> {
        (self.inner)(ctx)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{json_response, HearthError};
    use http::{Method, StatusCode};

    struct Counter {
        base: u64,
    }

    impl Counter {
        async fn next(self: Arc<Self>, ctx: RequestContext) -> HandlerResult {
            let step: u64 = ctx.query("step").and_then(|s| s.parse().ok()).unwrap_or(1);
            json_response(StatusCode::OK, &(self.base + step))
        }
    }

    #[tokio::test]
    async fn test_new_handler() {
        let handler = Handler::new(|_ctx| async { Err(HearthError::not_found("nothing here")) });
        let result = handler.call(RequestContext::new(Method::GET, "/")).await;
        assert!(matches!(result, Err(HearthError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_bound_handler_sees_receiver() {
        let counter = Arc::new(Counter { base: 40 });
        let handler = Handler::bind(&counter, Counter::next);

        let ctx = RequestContext::new(Method::GET, "/").with_query("step", "2");
        let response = handler.call(ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_handler_is_cloneable() {
        let handler = Handler::new(|_ctx| async { json_response(StatusCode::OK, &"ok") });
        let copy = handler.clone();
        assert!(copy.call(RequestContext::new(Method::GET, "/")).await.is_ok());
    }
}
