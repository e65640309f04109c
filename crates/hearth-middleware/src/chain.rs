//! Per-route chains.
//!
//! A [`RouteChain`] is what the route installer mounts for each route: the
//! route's middleware stages followed by its bound handler.

use std::fmt;
use std::sync::Arc;

use hearth_core::{Handler, HandlerResult, RequestContext};

use crate::middleware::{Endpoint, Middleware, Next};

/// Runs `stages` in order around `endpoint`.
pub async fn run_chain(
    stages: &[Arc<dyn Middleware>],
    endpoint: &dyn Endpoint,
    ctx: &mut RequestContext,
) -> HandlerResult {
    let mut next = Next::endpoint(endpoint);
    for stage in stages.iter().rev() {
        next = Next::new(stage.as_ref(), next);
    }
    next.run(ctx).await
}

/// Middleware stages plus the handler they guard.
///
/// # Example
///
/// ```
/// use hearth_core::{json_response, Handler, RequestContext};
/// use hearth_middleware::stages::RequestLogMiddleware;
/// use hearth_middleware::RouteChain;
/// use http::{Method, StatusCode};
///
/// # tokio_test::block_on(async {
/// let chain = RouteChain::new(Handler::new(|_ctx| async { json_response(StatusCode::OK, &"pong") }))
///     .with_stage(RequestLogMiddleware::new("/ping"));
///
/// let mut ctx = RequestContext::new(Method::GET, "/ping");
/// assert_eq!(chain.run(&mut ctx).await.unwrap().status(), StatusCode::OK);
/// # });
/// ```
#[derive(Clone)]
pub struct RouteChain {
    stages: Vec<Arc<dyn Middleware>>,
    handler: Handler,
}

impl RouteChain {
    /// Creates a chain with no stages.
    #[must_use]
    pub fn new(handler: Handler) -> Self {
        Self {
            stages: Vec::new(),
            handler,
        }
    }

    /// Appends a stage; stages run in the order they were added.
    #[must_use]
    pub fn with_stage(mut self, stage: impl Middleware) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Appends a shared stage.
    pub fn push(&mut self, stage: Arc<dyn Middleware>) {
        self.stages.push(stage);
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs the stages and then the handler.
    pub async fn run(&self, ctx: &mut RequestContext) -> HandlerResult {
        run_chain(&self.stages, &self.handler, ctx).await
    }
}

impl fmt::Debug for RouteChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteChain")
            .field("stages", &self.stage_names())
            .finish_non_exhaustive()
    }
}
