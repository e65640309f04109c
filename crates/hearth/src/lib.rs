//! # Hearth
//!
//! **A component-based HTTP server framework.**
//!
//! Applications are assembled from components discovered at startup:
//!
//! - **Services** hold shared state and logic
//! - **Routers** declare routes, validation rules and handlers
//!
//! Startup runs discovery → registry → two-phase injection → route
//! installation, then serves requests through a short per-route chain with
//! cookie-backed sessions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hearth::prelude::*;
//! use std::sync::Arc;
//!
//! struct Albums;
//!
//! impl Component for Albums {
//!     fn handler(self: Arc<Self>, name: &str) -> Option<Handler> {
//!         match name {
//!             "list" => Some(Handler::bind(&self, Albums::list)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! impl Albums {
//!     async fn list(self: Arc<Self>, _ctx: RequestContext) -> HandlerResult {
//!         json_response(StatusCode::OK, &["Blue", "Hejira"])
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_defaults().with_env_prefix("HEARTH").load()?;
//!     init_logging(&LogConfig::from(&config.logging))?;
//!
//!     let app = App::builder()
//!         .config(config)
//!         .exports(
//!             "app/albums",
//!             vec![Export::new(
//!                 ComponentDescriptor::router("albums")
//!                     .route(RouteDef::get("/albums", "list")
//!                         .rule(ValidationRule::query(["page"]))),
//!                 Albums,
//!             )],
//!         )
//!         .build()?;
//!
//!     app.serve().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request chain
//!
//! ```text
//! Request → Session → [RequestLog] → [Validation] → Handler
//!                                                     ↓
//! Response ← Set-Cookie / x-request-id ←──────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/hearth/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use hearth_config as config;
pub use hearth_core as core;
pub use hearth_middleware as middleware;
pub use hearth_router as router;
pub use hearth_server as server;
pub use hearth_telemetry as telemetry;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use hearth_config::{ConfigLoader, HearthConfig};
    pub use hearth_core::{
        json_response, BodySchema, Capability, Component, ComponentDescriptor, DiscoveryUnit,
        Export, Handler, HandlerResult, HearthError, RequestContext, Response, ResponseExt,
        RouteDef, ServiceMap, Session, ValidationRule,
    };
    pub use hearth_middleware::{SessionEvent, SessionHandler, SessionManager};
    pub use hearth_server::{App, AppBuilder, Server, ShutdownSignal};
    pub use hearth_telemetry::{init_logging, LogConfig};
    pub use http::{Method, StatusCode};
}
