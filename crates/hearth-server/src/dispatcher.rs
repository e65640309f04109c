//! Request dispatch.
//!
//! The [`Dispatcher`] turns an HTTP request into a [`RequestContext`], runs
//! the outer stages (the session stage in a built app) around the
//! [`RouteTable`], and stamps the response with `x-request-id`.
//!
//! Bodies with a JSON content type (`application/json` or `*+json`) are
//! parsed once here; a body that does not parse is answered with a 400
//! `INVALID_JSON_BODY` envelope before any route runs.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use hearth_core::{HearthError, RequestContext, Response};
use hearth_middleware::{run_chain, Middleware};
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{HeaderName, HeaderValue, Request};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use serde_json::Value;
use tracing::debug;

use crate::route_table::RouteTable;

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

struct Inner {
    table: RouteTable,
    stages: Vec<Arc<dyn Middleware>>,
}

/// Serves requests from a route table. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    /// Creates a dispatcher with no outer stages.
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self::with_stages(table, Vec::new())
    }

    /// Creates a dispatcher whose `stages` wrap every request.
    #[must_use]
    pub fn with_stages(table: RouteTable, stages: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            inner: Arc::new(Inner { table, stages }),
        }
    }

    /// Returns the route table.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.inner.table
    }

    /// Dispatches a request whose body is already collected.
    pub async fn dispatch(&self, request: Request<Bytes>) -> Response {
        let (parts, body) = request.into_parts();
        let mut ctx = context_from_parts(&parts);

        match parse_body(&parts, &body) {
            Ok(Some(value)) => ctx = ctx.with_body(value),
            Ok(None) => {}
            Err(err) => {
                let response = (self.inner.table.error_responder())(&ctx, &err);
                return stamp_request_id(response, &ctx);
            }
        }

        let response = match run_chain(&self.inner.stages, &self.inner.table, &mut ctx).await {
            Ok(response) => response,
            Err(err) => (self.inner.table.error_responder())(&ctx, &err),
        };
        stamp_request_id(response, &ctx)
    }

    /// Collects a hyper request body and dispatches it.
    pub async fn handle(&self, request: Request<Incoming>) -> Result<Response, Infallible> {
        let (parts, body) = request.into_parts();
        match body.collect().await {
            Ok(collected) => Ok(self
                .dispatch(Request::from_parts(parts, collected.to_bytes()))
                .await),
            Err(e) => {
                let ctx = context_from_parts(&parts);
                let err = HearthError::invalid_body(format!("Failed to read request body: {e}"));
                let response = (self.inner.table.error_responder())(&ctx, &err);
                Ok(stamp_request_id(response, &ctx))
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.inner.table)
            .field(
                "stages",
                &self.inner.stages.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn context_from_parts(parts: &Parts) -> RequestContext {
    RequestContext::new(parts.method.clone(), parts.uri.path())
        .with_headers(parts.headers.clone())
        .with_query_map(parse_query(parts.uri.query()))
}

fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let Some(query) = query else {
        return HashMap::new();
    };
    match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(e) => {
            debug!(error = %e, "ignoring malformed query string");
            HashMap::new()
        }
    }
}

fn is_json(parts: &Parts) -> bool {
    parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().to_ascii_lowercase())
        .is_some_and(|essence| essence == "application/json" || essence.ends_with("+json"))
}

fn parse_body(parts: &Parts, body: &Bytes) -> Result<Option<Value>, HearthError> {
    if body.is_empty() || !is_json(parts) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| HearthError::invalid_body(format!("Invalid JSON body: {e}")))
}

fn stamp_request_id(mut response: Response, ctx: &RequestContext) -> Response {
    if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
