//! Application assembly.
//!
//! [`AppBuilder::build`] runs startup in one direction:
//!
//! ```text
//! discovery → registry (frozen) → injection → session manager → route installation
//! ```
//!
//! Discovery and route-definition defects are logged and skipped; a
//! configuration or injection failure aborts the build.

use std::sync::Arc;

use hearth_config::HearthConfig;
use hearth_core::{inject, DiscoveryReport, DiscoveryUnit, Export, Registry, RegistrySnapshot};
use hearth_middleware::{Middleware, SessionManager, SessionMiddleware};
use hearth_telemetry::metrics;
use tracing::info;

use crate::dispatcher::Dispatcher;
use crate::error::ServerError;
use crate::installer::{install, InstallReport};
use crate::route_table::RouteTable;
use crate::server::Server;

/// A fully assembled application.
///
/// # Example
///
/// ```rust
/// use hearth_core::{json_response, Component, ComponentDescriptor, Export, Handler, RouteDef};
/// use hearth_server::App;
/// use http::StatusCode;
/// use std::sync::Arc;
///
/// struct Ping;
///
/// impl Component for Ping {
///     fn handler(self: Arc<Self>, name: &str) -> Option<Handler> {
///         (name == "pong").then(|| Handler::new(|_ctx| async { json_response(StatusCode::OK, &"pong") }))
///     }
/// }
///
/// let app = App::builder()
///     .exports("app/ping", vec![Export::new(
///         ComponentDescriptor::router("ping").route(RouteDef::get("/ping", "pong")),
///         Ping,
///     )])
///     .build()
///     .unwrap();
///
/// assert_eq!(app.install_report().installed.len(), 1);
/// ```
pub struct App {
    config: HearthConfig,
    registry: RegistrySnapshot,
    sessions: Arc<SessionManager>,
    dispatcher: Dispatcher,
    discovery: DiscoveryReport,
    installed: InstallReport,
}

impl App {
    /// Starts building an application.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Returns the configuration the app was built with.
    #[must_use]
    pub fn config(&self) -> &HearthConfig {
        &self.config
    }

    /// Returns the frozen registry.
    #[must_use]
    pub fn registry(&self) -> &RegistrySnapshot {
        &self.registry
    }

    /// Returns the session manager, for registering session handlers.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Returns the request dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Returns what discovery loaded and skipped.
    #[must_use]
    pub fn discovery_report(&self) -> &DiscoveryReport {
        &self.discovery
    }

    /// Returns what route installation mounted and skipped.
    #[must_use]
    pub fn install_report(&self) -> &InstallReport {
        &self.installed
    }

    /// Serves the app until ctrl-c or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn serve(&self) -> Result<(), ServerError> {
        Server::from_app(self).serve().await
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("dispatcher", &self.dispatcher)
            .field("installed", &self.installed.installed.len())
            .finish_non_exhaustive()
    }
}

/// Builder for [`App`].
#[derive(Debug, Default)]
pub struct AppBuilder {
    config: Option<HearthConfig>,
    units: Vec<DiscoveryUnit>,
}

impl AppBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration. Defaults to [`HearthConfig::default`].
    #[must_use]
    pub fn config(mut self, config: HearthConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Adds a discovery unit.
    #[must_use]
    pub fn unit(mut self, unit: DiscoveryUnit) -> Self {
        self.units.push(unit);
        self
    }

    /// Adds several discovery units.
    #[must_use]
    pub fn units(mut self, units: impl IntoIterator<Item = DiscoveryUnit>) -> Self {
        self.units.extend(units);
        self
    }

    /// Adds a unit made of already-built exports.
    #[must_use]
    pub fn exports(self, origin: impl Into<String>, exports: Vec<Export>) -> Self {
        self.unit(DiscoveryUnit::from_exports(origin, exports))
    }

    /// Runs discovery, injection and route installation.
    ///
    /// Metric descriptions are registered with whichever `metrics` recorder
    /// is installed at this point.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Startup`] for invalid configuration or a
    /// failed injection hook, and [`ServerError::Session`] if the session
    /// manager cannot be built.
    pub fn build(self) -> Result<App, ServerError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        metrics::describe_metrics();

        let mut registry = Registry::new();
        let discovery = registry.discover(self.units);
        info!(
            units = discovery.loaded.len(),
            failed = discovery.failed.len(),
            services = registry.service_count(),
            routers = registry.router_count(),
            "discovery complete"
        );
        let registry = registry.freeze();

        inject(&registry, &config)?;

        let sessions = Arc::new(SessionManager::new(config.session.clone())?);

        let mut table = RouteTable::new();
        let installed = install(&registry, &config, &mut table);

        let stages: Vec<Arc<dyn Middleware>> =
            vec![Arc::new(SessionMiddleware::new(Arc::clone(&sessions)))];
        let dispatcher = Dispatcher::with_stages(table, stages);

        Ok(App {
            config,
            registry,
            sessions,
            dispatcher,
            discovery,
            installed,
        })
    }
}
