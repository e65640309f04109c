//! Request context types.
//!
//! The [`RequestContext`] carries all per-request state through the middleware
//! chain and into handlers: the decoded request (method, path, headers, query
//! map, parsed JSON body), the matched path parameters, the request id and the
//! resolved [`Session`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::BoxFuture;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use hearth_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Backend that owns claims data for sessions.
///
/// The session manager implements this by forwarding to the application's
/// registered handlers; handlers only ever see it through [`Session`].
pub trait ClaimStore: Send + Sync + 'static {
    /// Reads one claim for a session.
    fn get_claim<'a>(
        &'a self,
        session_id: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Option<Value>>>;

    /// Writes one claim for a session.
    fn set_claim<'a>(
        &'a self,
        session_id: &'a str,
        key: &'a str,
        value: Value,
    ) -> BoxFuture<'a, anyhow::Result<()>>;
}

/// The session resolved for a request.
///
/// Cheap to clone; the claims backend is shared.
#[derive(Clone)]
pub struct Session {
    id: String,
    created: bool,
    store: Arc<dyn ClaimStore>,
}

impl Session {
    /// Creates a session handle.
    pub fn new(id: impl Into<String>, created: bool, store: Arc<dyn ClaimStore>) -> Self {
        Self {
            id: id.into(),
            created,
            store,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `true` if the identifier was generated for this request.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.created
    }

    /// Reads a claim through the registered backend.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn get_claim(&self, key: &str) -> anyhow::Result<Option<Value>> {
        self.store.get_claim(&self.id, key).await
    }

    /// Writes a claim through the registered backend.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn set_claim(&self, key: &str, value: impl Into<Value>) -> anyhow::Result<()> {
        self.store.set_claim(&self.id, key, value.into()).await
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}

/// Per-request context that flows through the middleware chain.
///
/// # Example
///
/// ```
/// use hearth_core::RequestContext;
/// use http::Method;
///
/// let ctx = RequestContext::new(Method::GET, "/albums")
///     .with_query("page", "2")
///     .with_header("x-api-key", "abc");
///
/// assert_eq!(ctx.query("page"), Some("2"));
/// assert_eq!(ctx.header("X-API-KEY"), Some("abc"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    headers: HeaderMap,
    query: HashMap<String, String>,
    body: Option<Value>,
    params: Vec<(String, String)>,
    session: Option<Session>,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for a method and path with empty headers, query and body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: HashMap::new(),
            body: None,
            params: Vec::new(),
            session: None,
            started_at: Instant::now(),
        }
    }

    /// Replaces the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Adds one header. Invalid names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            http::header::HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Replaces the query map.
    #[must_use]
    pub fn with_query_map(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Adds one query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Sets the parsed body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path, without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns all request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value by name, case-insensitively.
    ///
    /// Values that are not visible ASCII are treated as absent.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the parsed query map.
    #[must_use]
    pub const fn query_map(&self) -> &HashMap<String, String> {
        &self.query
    }

    /// Returns a query parameter.
    #[must_use]
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Returns the parsed JSON body, if the request carried one.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns a matched path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns all matched path parameters, in pattern order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Sets the matched path parameters.
    pub fn set_params(&mut self, params: Vec<(String, String)>) {
        self.params = params;
    }

    /// Returns the session resolved for this request.
    #[must_use]
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Attaches the resolved session.
    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
