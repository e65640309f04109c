//! The session manager.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use hearth_config::SessionConfig;
use hearth_core::{BoxFuture, ClaimStore, Session};
use hearth_telemetry::metrics;
use http::{HeaderMap, HeaderValue};
use parking_lot::RwLock;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::cookie::{find_cookie, CookieSigner};
use super::{SessionError, SessionEvent, SessionHandler};

/// Length of generated session ids.
pub const SESSION_ID_LEN: usize = 20;

/// Resolves session ids from cookies and forwards claims to the application.
///
/// The handler table is the only state that changes after startup. Each
/// event accepts one handler; later registrations are rejected.
///
/// # Example
///
/// ```
/// use hearth_config::SessionConfig;
/// use hearth_middleware::session::SessionManager;
///
/// let sessions = SessionManager::new(SessionConfig::default()).unwrap();
/// sessions
///     .on_created(|id| async move {
///         tracing::info!(session_id = %id, "welcome");
///         Ok(())
///     })
///     .unwrap();
/// ```
pub struct SessionManager {
    config: SessionConfig,
    signer: Option<CookieSigner>,
    handlers: RwLock<HashMap<SessionEvent, SessionHandler>>,
}

impl SessionManager {
    /// Creates a manager from session configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MissingSecret`] when signing is enabled
    /// without a secret.
    pub fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let signer = if config.signed {
            let secret = config.secret.as_deref().ok_or(SessionError::MissingSecret)?;
            Some(CookieSigner::new(secret)?)
        } else {
            None
        };

        Ok(Self {
            config,
            signer,
            handlers: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Registers the handler for an event.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyRegistered`] if the event already has a
    /// handler (the original is kept), or [`SessionError::HandlerMismatch`]
    /// if the handler was built for another event.
    pub fn on(&self, event: SessionEvent, handler: SessionHandler) -> Result<(), SessionError> {
        if handler.event() != event {
            return Err(SessionError::HandlerMismatch {
                event,
                handler: handler.event(),
            });
        }

        let mut handlers = self.handlers.write();
        if handlers.contains_key(&event) {
            warn!(event = %event, "session handler already registered, keeping the first");
            return Err(SessionError::AlreadyRegistered { event });
        }
        handlers.insert(event, handler);
        debug!(event = %event, "session handler registered");
        Ok(())
    }

    /// Registers the `created` handler.
    pub fn on_created<F, Fut>(&self, f: F) -> Result<(), SessionError>
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on(SessionEvent::Created, SessionHandler::created(f))
    }

    /// Registers the `claims:get` handler.
    pub fn on_claims_get<F, Fut>(&self, f: F) -> Result<(), SessionError>
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Option<Value>>> + Send + 'static,
    {
        self.on(SessionEvent::ClaimsGet, SessionHandler::claims_get(f))
    }

    /// Registers the `claims:set` handler.
    pub fn on_claims_set<F, Fut>(&self, f: F) -> Result<(), SessionError>
    where
        F: Fn(String, String, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on(SessionEvent::ClaimsSet, SessionHandler::claims_set(f))
    }

    /// Returns true if the event has a handler.
    #[must_use]
    pub fn has_handler(&self, event: SessionEvent) -> bool {
        self.handlers.read().contains_key(&event)
    }

    fn handler(&self, event: SessionEvent) -> Option<SessionHandler> {
        self.handlers.read().get(&event).cloned()
    }

    /// Generates a fresh session id.
    #[must_use]
    pub fn generate_id() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(SESSION_ID_LEN)
            .map(char::from)
            .collect()
    }

    /// Returns true if `id` has the shape of a generated id.
    #[must_use]
    pub fn is_well_formed(id: &str) -> bool {
        id.len() == SESSION_ID_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
    }

    /// Reads and verifies the inbound session id.
    #[must_use]
    pub fn read_id(&self, headers: &HeaderMap) -> Option<String> {
        let raw = find_cookie(headers, &self.config.cookie_name)?;
        let id = match &self.signer {
            Some(signer) => signer.unsign(raw)?,
            None => raw,
        };
        Self::is_well_formed(id).then(|| id.to_string())
    }

    /// Encodes an id as the cookie value.
    #[must_use]
    pub fn encode_id(&self, id: &str) -> String {
        match &self.signer {
            Some(signer) => signer.sign(id),
            None => id.to_string(),
        }
    }

    /// Builds the `Set-Cookie` header for an id.
    #[must_use]
    pub fn set_cookie(&self, id: &str) -> Option<HeaderValue> {
        let config = &self.config;
        let mut cookie = format!(
            "{}={}; Path={}",
            config.cookie_name,
            self.encode_id(id),
            config.path
        );
        if let Some(max_age) = config.max_age_secs {
            cookie.push_str(&format!("; Max-Age={max_age}"));
        }
        if config.http_only {
            cookie.push_str("; HttpOnly");
        }
        if config.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str("; SameSite=Lax");

        match HeaderValue::from_str(&cookie) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, cookie_name = %config.cookie_name, "session cookie is not a valid header");
                None
            }
        }
    }

    /// Resolves the session for a request.
    ///
    /// A valid inbound id is reused as-is. Otherwise a new id is generated
    /// and the `created` handler is awaited; its failure is logged and does
    /// not stop the request.
    pub async fn resolve(self: &Arc<Self>, headers: &HeaderMap) -> Session {
        let store = Arc::clone(self) as Arc<dyn ClaimStore>;

        if let Some(id) = self.read_id(headers) {
            return Session::new(id, false, store);
        }

        let id = Self::generate_id();
        metrics::record_session_created();
        debug!(session_id = %id, "session created");

        if let Some(SessionHandler::Created(created)) = self.handler(SessionEvent::Created) {
            if let Err(e) = created(id.clone()).await {
                error!(session_id = %id, error = %e, "session created handler failed");
            }
        }

        Session::new(id, true, store)
    }

    /// Reads a claim through the `claims:get` handler.
    ///
    /// Without a handler this logs a warning and returns `Ok(None)`.
    pub async fn get_claim(&self, session_id: &str, key: &str) -> anyhow::Result<Option<Value>> {
        match self.handler(SessionEvent::ClaimsGet) {
            Some(SessionHandler::ClaimsGet(get)) => get(session_id.to_string(), key.to_string()).await,
            _ => {
                warn!(session_id, key, "no claims:get handler registered");
                Ok(None)
            }
        }
    }

    /// Writes a claim through the `claims:set` handler.
    ///
    /// Without a handler this logs a warning and does nothing.
    pub async fn set_claim(&self, session_id: &str, key: &str, value: Value) -> anyhow::Result<()> {
        match self.handler(SessionEvent::ClaimsSet) {
            Some(SessionHandler::ClaimsSet(set)) => {
                set(session_id.to_string(), key.to_string(), value).await
            }
            _ => {
                warn!(session_id, key, "no claims:set handler registered");
                Ok(())
            }
        }
    }
}

impl ClaimStore for SessionManager {
    fn get_claim<'a>(
        &'a self,
        session_id: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, anyhow::Result<Option<Value>>> {
        Box::pin(Self::get_claim(self, session_id, key))
    }

    fn set_claim<'a>(
        &'a self,
        session_id: &'a str,
        key: &'a str,
        value: Value,
    ) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(Self::set_claim(self, session_id, key, value))
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("cookie_name", &self.config.cookie_name)
            .field("signed", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}
