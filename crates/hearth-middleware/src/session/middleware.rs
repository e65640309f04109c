//! Session stage.
//!
//! Resolves the session before the route runs and, when a new id was
//! issued, appends its `Set-Cookie` header to whatever response comes back.

use std::sync::Arc;

use hearth_core::{BoxFuture, HandlerResult, RequestContext};
use http::header::SET_COOKIE;

use super::SessionManager;
use crate::middleware::{Middleware, Next};

/// Middleware that attaches a [`Session`](hearth_core::Session) to every request.
#[derive(Debug, Clone)]
pub struct SessionMiddleware {
    manager: Arc<SessionManager>,
}

impl SessionMiddleware {
    /// Creates the stage over a shared manager.
    #[must_use]
    pub fn new(manager: Arc<SessionManager>) -> Self {
        Self { manager }
    }
}

impl Middleware for SessionMiddleware {
    fn name(&self) -> &'static str {
        "session"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlerResult> {
        Box::pin(async move {
            let session = self.manager.resolve(ctx.headers()).await;
            let issued = session
                .is_new()
                .then(|| self.manager.set_cookie(session.id()))
                .flatten();
            ctx.set_session(session);

            let mut response = next.run(ctx).await?;
            if let Some(cookie) = issued {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_config::SessionConfig;
    use hearth_core::{json_response, Handler};
    use http::header::COOKIE;
    use http::{Method, StatusCode};

    fn whoami() -> Handler {
        Handler::new(|ctx: RequestContext| async move {
            let id = ctx.session().map(|s| s.id().to_string());
            json_response(StatusCode::OK, &id)
        })
    }

    #[tokio::test]
    async fn test_new_session_sets_cookie() {
        let manager = Arc::new(SessionManager::new(SessionConfig::default()).unwrap());
        let stage = SessionMiddleware::new(manager);
        let handler = whoami();

        let mut ctx = RequestContext::new(Method::GET, "/me");
        let response = Next::new(&stage, Next::endpoint(&handler))
            .run(&mut ctx)
            .await
            .unwrap();

        let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
        let id = ctx.session().unwrap().id();
        assert!(cookie.starts_with(&format!("sid={id};")));
    }

    #[tokio::test]
    async fn test_existing_session_sets_no_cookie() {
        let manager = Arc::new(SessionManager::new(SessionConfig::default()).unwrap());
        let stage = SessionMiddleware::new(manager);
        let handler = whoami();
        let id = SessionManager::generate_id();

        let mut ctx = RequestContext::new(Method::GET, "/me")
            .with_header(COOKIE.as_str(), &format!("sid={id}"));
        let response = Next::new(&stage, Next::endpoint(&handler))
            .run(&mut ctx)
            .await
            .unwrap();

        assert!(response.headers().get(SET_COOKIE).is_none());
        assert_eq!(ctx.session().unwrap().id(), id);
    }
}
