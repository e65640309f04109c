//! Transport binding.
//!
//! The route installer talks to the transport only through
//! [`TransportBinder`]: one `mount` per route, then the two catch-all
//! responders. [`RouteTable`] is the built-in binder, a radix-tree lookup
//! that the [`Dispatcher`](crate::Dispatcher) serves from.

use std::fmt;

use hearth_core::{BoxFuture, HandlerResult, RequestContext};
use hearth_middleware::{Endpoint, RouteChain};
use hearth_router::{MethodFilter, RouteError, Router};
use http::Method;

use crate::responders::{self, ErrorResponder, NotFoundResponder};

/// Receives installed routes.
pub trait TransportBinder {
    /// Error returned when a route cannot be mounted.
    type Error: fmt::Display;

    /// Mounts a route's chain on `(filter, path)`.
    fn mount(&mut self, filter: MethodFilter, path: &str, chain: RouteChain) -> Result<(), Self::Error>;

    /// Mounts the responder for requests no route matched.
    fn mount_not_found(&mut self, responder: NotFoundResponder);

    /// Mounts the responder for errors that escaped a chain.
    fn mount_error(&mut self, responder: ErrorResponder);
}

struct Mounted {
    pattern: String,
    chain: RouteChain,
}

/// The built-in binder.
///
/// When mounted routes overlap, the one mounted first answers, so routers
/// installed earlier are never preempted by later ones. A second mount of
/// the same `(method, path)` pair is rejected.
pub struct RouteTable {
    router: Router<Mounted>,
    not_found: NotFoundResponder,
    on_error: ErrorResponder,
}

impl RouteTable {
    /// Creates an empty table with the standard responders.
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            not_found: responders::not_found(),
            on_error: responders::internal_error(),
        }
    }

    /// Returns the number of mounted routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.router.len()
    }

    /// Returns true if nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.router.is_empty()
    }

    /// Returns the route pattern a request would hit.
    #[must_use]
    pub fn matched_pattern(&self, method: &Method, path: &str) -> Option<&str> {
        self.router
            .at(method, path)
            .map(|m| m.value.pattern.as_str())
    }

    pub(crate) fn error_responder(&self) -> &ErrorResponder {
        &self.on_error
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.router.len())
            .finish_non_exhaustive()
    }
}

impl TransportBinder for RouteTable {
    type Error = RouteError;

    fn mount(&mut self, filter: MethodFilter, path: &str, chain: RouteChain) -> Result<(), RouteError> {
        self.router.insert(
            filter,
            path,
            Mounted {
                pattern: path.to_string(),
                chain,
            },
        )
    }

    fn mount_not_found(&mut self, responder: NotFoundResponder) {
        self.not_found = responder;
    }

    fn mount_error(&mut self, responder: ErrorResponder) {
        self.on_error = responder;
    }
}

impl Endpoint for RouteTable {
    fn serve<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let Some(found) = self.router.at(ctx.method(), ctx.path()) else {
                return Ok((self.not_found)(ctx));
            };
            let mounted = found.value;
            ctx.set_params(found.params.into_vec());

            match mounted.chain.run(ctx).await {
                Ok(response) => Ok(response),
                Err(err) => Ok((self.on_error)(ctx, &err)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::{json_response, Handler, HearthError, Response, ResponseExt};
    use http::StatusCode;
    use std::sync::Arc;

    fn named(name: &'static str) -> RouteChain {
        RouteChain::new(Handler::new(move |ctx: RequestContext| async move {
            let params: Vec<_> = ctx.params().to_vec();
            json_response(StatusCode::OK, &(name, params))
        }))
    }

    async fn serve(table: &RouteTable, method: Method, path: &str) -> (Response, RequestContext) {
        let mut ctx = RequestContext::new(method, path);
        let response = table.serve(&mut ctx).await.unwrap();
        (response, ctx)
    }

    #[tokio::test]
    async fn test_params_reach_context() {
        let mut table = RouteTable::new();
        table
            .mount(MethodFilter::Only(Method::GET), "/albums/{id}", named("show"))
            .unwrap();

        let (response, ctx) = serve(&table, Method::GET, "/albums/42").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(table.matched_pattern(&Method::GET, "/albums/42"), Some("/albums/{id}"));
    }

    #[tokio::test]
    async fn test_unmatched_uses_not_found_responder() {
        let mut table = RouteTable::new();
        table
            .mount(MethodFilter::Only(Method::GET), "/albums", named("list"))
            .unwrap();

        let (response, _) = serve(&table, Method::DELETE, "/albums").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_duplicate_mount_rejected() {
        let mut table = RouteTable::new();
        table.mount(MethodFilter::Any, "/ping", named("first")).unwrap();
        assert!(table.mount(MethodFilter::Any, "/ping", named("second")).is_err());
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_custom_responders() {
        let mut table = RouteTable::new();
        table
            .mount(
                MethodFilter::Any,
                "/fail",
                RouteChain::new(Handler::new(|_ctx| async { Err(HearthError::internal("boom")) })),
            )
            .unwrap();
        table.mount_not_found(Arc::new(|_ctx| Response::text(StatusCode::GONE, "gone")));
        table.mount_error(Arc::new(|_ctx, _err| Response::text(StatusCode::IM_A_TEAPOT, "teapot")));

        assert_eq!(serve(&table, Method::GET, "/none").await.0.status(), StatusCode::GONE);
        assert_eq!(serve(&table, Method::GET, "/fail").await.0.status(), StatusCode::IM_A_TEAPOT);
    }
}
