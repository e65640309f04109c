//! # Hearth Middleware
//!
//! Per-route request chains for the Hearth server framework.
//!
//! Every mounted route runs a short, fixed-shape chain assembled by the
//! route installer:
//!
//! ```text
//! Session → [RequestLog] → [Validation] → Handler
//! ```
//!
//! - [`SessionMiddleware`](session::SessionMiddleware) wraps the whole
//!   dispatcher and attaches a session to every request
//! - [`RequestLogMiddleware`](stages::RequestLogMiddleware) is added when
//!   verbose logging is on
//! - [`ValidationMiddleware`](stages::ValidationMiddleware) is added when the
//!   route declares rules
//!
//! Handlers run on their own task; a panic becomes an internal error.
//!
//! ## Example
//!
//! ```
//! use hearth_core::{json_response, Handler, RequestContext, ValidationRule};
//! use hearth_middleware::stages::ValidationMiddleware;
//! use hearth_middleware::RouteChain;
//! use http::{Method, StatusCode};
//!
//! # tokio_test::block_on(async {
//! let chain = RouteChain::new(Handler::new(|_ctx| async { json_response(StatusCode::OK, &"ok") }))
//!     .with_stage(ValidationMiddleware::new("/search", vec![ValidationRule::query(["q"])]));
//!
//! let mut ctx = RequestContext::new(Method::GET, "/search");
//! let err = chain.run(&mut ctx).await.unwrap_err();
//! assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/hearth-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod middleware;
pub mod session;
pub mod stages;

pub use chain::{run_chain, RouteChain};
pub use middleware::{Endpoint, Middleware, Next};
pub use session::{SessionError, SessionEvent, SessionHandler, SessionManager, SessionMiddleware};
