//! Session events and their handlers.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use hearth_core::BoxFuture;
use serde_json::Value;

/// Extension points of the session manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    /// A new session id was issued.
    Created,
    /// A handler read a claim.
    ClaimsGet,
    /// A handler wrote a claim.
    ClaimsSet,
}

impl SessionEvent {
    /// Returns the event's wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::ClaimsGet => "claims:get",
            Self::ClaimsSet => "claims:set",
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) type CreatedFn = dyn Fn(String) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;
pub(crate) type ClaimsGetFn =
    dyn Fn(String, String) -> BoxFuture<'static, anyhow::Result<Option<Value>>> + Send + Sync;
pub(crate) type ClaimsSetFn =
    dyn Fn(String, String, Value) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync;

/// An application callback for one [`SessionEvent`].
///
/// Callbacks receive owned arguments so their futures can outlive the
/// handler table lookup.
#[derive(Clone)]
pub enum SessionHandler {
    /// Called with the new session id.
    Created(Arc<CreatedFn>),
    /// Called with the session id and claim key.
    ClaimsGet(Arc<ClaimsGetFn>),
    /// Called with the session id, claim key and value.
    ClaimsSet(Arc<ClaimsSetFn>),
}

impl SessionHandler {
    /// Wraps a `created` callback.
    pub fn created<F, Fut>(f: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::Created(Arc::new(move |id| Box::pin(f(id))))
    }

    /// Wraps a `claims:get` callback.
    pub fn claims_get<F, Fut>(f: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<Value>>> + Send + 'static,
    {
        Self::ClaimsGet(Arc::new(move |id, key| Box::pin(f(id, key))))
    }

    /// Wraps a `claims:set` callback.
    pub fn claims_set<F, Fut>(f: F) -> Self
    where
        F: Fn(String, String, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self::ClaimsSet(Arc::new(move |id, key, value| Box::pin(f(id, key, value))))
    }

    /// Returns the event this handler was built for.
    #[must_use]
    pub const fn event(&self) -> SessionEvent {
        match self {
            Self::Created(_) => SessionEvent::Created,
            Self::ClaimsGet(_) => SessionEvent::ClaimsGet,
            Self::ClaimsSet(_) => SessionEvent::ClaimsSet,
        }
    }
}

impl fmt::Debug for SessionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionHandler").field(&self.event()).finish()
    }
}
