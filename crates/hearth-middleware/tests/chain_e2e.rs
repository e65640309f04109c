//! End-to-end chain tests.
//!
//! These run the same shape the server mounts for a route:
//!
//! 1. Session - resolve or issue the session id
//! 2. Request log - log and record metrics
//! 3. Validation - enforce the route's rules
//! 4. Handler

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use hearth_config::SessionConfig;
use hearth_core::{json_response, BodySchema, Handler, HandlerResult, RequestContext, ValidationRule};
use hearth_middleware::stages::{RequestLogMiddleware, ValidationMiddleware};
use hearth_middleware::{run_chain, Endpoint, Middleware, RouteChain, SessionManager, SessionMiddleware};
use http::header::{COOKIE, SET_COOKIE};
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{json, Value};

struct Route(RouteChain);

impl Endpoint for Route {
    fn serve<'a>(
        &'a self,
        ctx: &'a mut RequestContext,
    ) -> hearth_core::BoxFuture<'a, HandlerResult> {
        Box::pin(self.0.run(ctx))
    }
}

fn profile_route() -> RouteChain {
    let handler = Handler::new(|ctx: RequestContext| async move {
        let session = ctx.session().cloned();
        let name = ctx
            .body()
            .and_then(|b| b.get("name"))
            .cloned()
            .unwrap_or(Value::Null);
        if let Some(session) = &session {
            session
                .set_claim("name", name.clone())
                .await
                .map_err(|e| hearth_core::HearthError::internal_with_source("claims", e))?;
        }
        json_response(StatusCode::OK, &json!({ "name": name }))
    });

    RouteChain::new(handler)
        .with_stage(RequestLogMiddleware::new("/profile"))
        .with_stage(ValidationMiddleware::new(
            "/profile",
            vec![ValidationRule::body(BodySchema::new().field("name", Value::is_string))],
        ))
}

fn sessions() -> (Arc<SessionManager>, Arc<AtomicUsize>, Arc<Mutex<HashMap<String, Value>>>) {
    let manager = Arc::new(SessionManager::new(SessionConfig::default()).unwrap());
    let created = Arc::new(AtomicUsize::new(0));
    let claims: Arc<Mutex<HashMap<String, Value>>> = Arc::default();

    let counter = Arc::clone(&created);
    manager
        .on_created(move |_id| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .unwrap();

    let sink = Arc::clone(&claims);
    manager
        .on_claims_set(move |id, key, value| {
            sink.lock().insert(format!("{id}/{key}"), value);
            async { Ok(()) }
        })
        .unwrap();

    (manager, created, claims)
}

async fn dispatch(
    outer: &[Arc<dyn Middleware>],
    route: &Route,
    mut ctx: RequestContext,
) -> (HandlerResult, RequestContext) {
    let result = run_chain(outer, route, &mut ctx).await;
    (result, ctx)
}

#[tokio::test]
async fn test_valid_request_reaches_handler_and_claims() {
    let (manager, created, claims) = sessions();
    let outer: Vec<Arc<dyn Middleware>> = vec![Arc::new(SessionMiddleware::new(manager))];
    let route = Route(profile_route());

    let ctx = RequestContext::new(Method::POST, "/profile").with_body(json!({ "name": "Ada" }));
    let (result, ctx) = dispatch(&outer, &route, ctx).await;
    let response = result.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(SET_COOKIE));
    assert_eq!(created.load(Ordering::SeqCst), 1);

    let id = ctx.session().unwrap().id().to_string();
    assert_eq!(claims.lock().get(&format!("{id}/name")), Some(&json!("Ada")));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["name"], "Ada");
}

#[tokio::test]
async fn test_invalid_body_is_rejected_before_handler() {
    let (manager, _created, claims) = sessions();
    let outer: Vec<Arc<dyn Middleware>> = vec![Arc::new(SessionMiddleware::new(manager))];
    let route = Route(profile_route());

    let ctx = RequestContext::new(Method::POST, "/profile").with_body(json!({ "name": 7 }));
    let (result, _ctx) = dispatch(&outer, &route, ctx).await;
    let err = result.unwrap_err();

    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.to_string(), "Invalid property \"name\" on body!");
    assert!(claims.lock().is_empty());
}

#[tokio::test]
async fn test_returning_client_keeps_session() {
    let (manager, created, _claims) = sessions();
    let outer: Vec<Arc<dyn Middleware>> = vec![Arc::new(SessionMiddleware::new(manager))];
    let route = Route(profile_route());

    let first = RequestContext::new(Method::POST, "/profile").with_body(json!({ "name": "Ada" }));
    let (result, ctx) = dispatch(&outer, &route, first).await;
    let cookie = result.unwrap().headers()[SET_COOKIE].to_str().unwrap().to_string();
    let pair = cookie.split(';').next().unwrap().to_string();
    let id = ctx.session().unwrap().id().to_string();

    for _ in 0..2 {
        let again = RequestContext::new(Method::POST, "/profile")
            .with_header(COOKIE.as_str(), &pair)
            .with_body(json!({ "name": "Ada" }));
        let (result, ctx) = dispatch(&outer, &route, again).await;

        assert!(!result.unwrap().headers().contains_key(SET_COOKIE));
        assert_eq!(ctx.session().unwrap().id(), id);
    }
    assert_eq!(created.load(Ordering::SeqCst), 1);
}
