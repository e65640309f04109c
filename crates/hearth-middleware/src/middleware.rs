//! Core middleware trait and types.
//!
//! A [`Middleware`] wraps the rest of a chain. It receives the mutable
//! [`RequestContext`] and a [`Next`] to continue; it may short-circuit by
//! returning without calling `next`, or post-process what comes back.
//!
//! The chain ends at an [`Endpoint`]. Route handlers are endpoints: each call
//! runs on its own task so a panic is contained and surfaces as an internal
//! error instead of tearing down the connection.
//!
//! # Example
//!
//! ```
//! use hearth_core::{BoxFuture, HandlerResult, RequestContext};
//! use hearth_middleware::{Middleware, Next};
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut RequestContext,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, HandlerResult> {
//!         Box::pin(async move {
//!             let result = next.run(ctx).await;
//!             tracing::debug!(elapsed = ?ctx.elapsed(), "chain finished");
//!             result
//!         })
//!     }
//! }
//! ```

use hearth_core::{BoxFuture, Handler, HandlerResult, HearthError, RequestContext};
use tracing::error;

/// A step in a route's chain.
///
/// Middleware must call `next.run()` at most once and must not swallow a
/// downstream error it cannot render.
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this step, used in logs.
    fn name(&self) -> &'static str;

    /// Processes the request, usually by delegating to `next`.
    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult>;
}

/// The terminal step of a chain.
pub trait Endpoint: Send + Sync {
    /// Produces the response for a request.
    fn serve<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult>;
}

impl Endpoint for Handler {
    fn serve<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        let task = self.call(ctx.clone());
        Box::pin(async move {
            match tokio::spawn(task).await {
                Ok(result) => result,
                Err(join) if join.is_panic() => {
                    let detail = panic_message(join.into_panic());
                    error!(panic = %detail, "handler panicked");
                    Err(HearthError::internal(format!("handler panicked: {detail}")))
                }
                Err(join) => Err(HearthError::internal_with_source("handler task failed", join)),
            }
        })
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Continuation handed to a middleware.
///
/// Consumed by [`Next::run`], so it can only be invoked once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Endpoint(&'a dyn Endpoint),
}

impl<'a> Next<'a> {
    /// Wraps `next` in a middleware.
    #[must_use]
    pub fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal continuation.
    #[must_use]
    pub fn endpoint(endpoint: &'a dyn Endpoint) -> Self {
        Self {
            inner: NextInner::Endpoint(endpoint),
        }
    }

    /// Invokes the next middleware or the endpoint.
    pub async fn run(self, ctx: &mut RequestContext) -> HandlerResult {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, *next).await,
            NextInner::Endpoint(endpoint) => endpoint.serve(ctx).await,
        }
    }
}
