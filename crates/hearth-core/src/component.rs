//! The component model.
//!
//! Applications are built from two kinds of components:
//!
//! - **Services** hold shared logic and state.
//! - **Routers** own routes and the handlers behind them.
//!
//! A component is described by a [`ComponentDescriptor`] that travels with
//! the instance in an [`Export`]. The descriptor names the component, gives
//! its kind, lists its routes and declares which startup hooks
//! ([`Capability`]) it implements.
//!
//! # Example
//!
//! ```
//! use hearth_core::{
//!     json_response, Capability, Component, ComponentDescriptor, Export, Handler,
//!     HandlerResult, RequestContext, RouteDef, ServiceMap,
//! };
//! use http::StatusCode;
//! use std::sync::{Arc, OnceLock};
//!
//! struct Greeter;
//!
//! #[derive(Default)]
//! struct Hello {
//!     greeter: OnceLock<Arc<Greeter>>,
//! }
//!
//! impl Component for Greeter {}
//!
//! impl Component for Hello {
//!     fn on_injection(&self, services: &ServiceMap) -> anyhow::Result<()> {
//!         let greeter = services
//!             .get::<Greeter>("greeter")
//!             .ok_or_else(|| anyhow::anyhow!("greeter service missing"))?;
//!         let _ = self.greeter.set(greeter);
//!         Ok(())
//!     }
//!
//!     fn handler(self: Arc<Self>, name: &str) -> Option<Handler> {
//!         match name {
//!             "index" => Some(Handler::bind(&self, Hello::index)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! impl Hello {
//!     async fn index(self: Arc<Self>, _ctx: RequestContext) -> HandlerResult {
//!         json_response(StatusCode::OK, &"hello")
//!     }
//! }
//!
//! let exports = vec![
//!     Export::new(ComponentDescriptor::service("greeter"), Greeter),
//!     Export::new(
//!         ComponentDescriptor::router("hello")
//!             .with_capability(Capability::Injection)
//!             .route(RouteDef::get("/hello", "index")),
//!         Hello::default(),
//!     ),
//! ];
//! # let _ = exports;
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use hearth_config::HearthConfig;
use http::Method;

use crate::validation::ValidationRule;
use crate::{Handler, ServiceMap};

/// Kind of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Shared, injectable logic.
    Service,
    /// Owner of routes.
    Router,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service => f.write_str("service"),
            Self::Router => f.write_str("router"),
        }
    }
}

/// Startup hooks a component implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Receives the service map via [`Component::on_injection`].
    Injection,
    /// Receives a configuration copy via [`Component::on_config`].
    Config,
}

/// A route declared by a router.
#[derive(Debug, Clone)]
pub struct RouteDef {
    /// Path pattern (`/albums/{id}`, `/albums/:id`, `/static/*rest`).
    pub path: String,
    /// Method, or `None` for every method.
    pub method: Option<Method>,
    /// Name of the handler on the owning router.
    pub handler: String,
    /// Rules evaluated before the handler, in order.
    pub rules: Vec<ValidationRule>,
}

impl RouteDef {
    /// Creates a route.
    #[must_use]
    pub fn new(method: Option<Method>, path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            handler: handler.into(),
            rules: Vec::new(),
        }
    }

    /// Creates a `GET` route.
    #[must_use]
    pub fn get(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(Some(Method::GET), path, handler)
    }

    /// Creates a `POST` route.
    #[must_use]
    pub fn post(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(Some(Method::POST), path, handler)
    }

    /// Creates a `PUT` route.
    #[must_use]
    pub fn put(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(Some(Method::PUT), path, handler)
    }

    /// Creates a `PATCH` route.
    #[must_use]
    pub fn patch(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(Some(Method::PATCH), path, handler)
    }

    /// Creates a `DELETE` route.
    #[must_use]
    pub fn delete(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(Some(Method::DELETE), path, handler)
    }

    /// Creates a route matching every method.
    #[must_use]
    pub fn all(path: impl Into<String>, handler: impl Into<String>) -> Self {
        Self::new(None, path, handler)
    }

    /// Appends a validation rule.
    #[must_use]
    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }
}

/// Classification attached to an exported component.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// Unique name within the kind's namespace.
    pub name: String,
    /// Service or router.
    pub kind: ComponentKind,
    /// Install order for routers, ascending.
    pub priority: i32,
    /// Routes, for routers.
    pub routes: Vec<RouteDef>,
    /// Hooks the component implements.
    pub capabilities: Vec<Capability>,
}

impl ComponentDescriptor {
    fn new(name: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            name: name.into(),
            kind,
            priority: 0,
            routes: Vec::new(),
            capabilities: Vec::new(),
        }
    }

    /// Describes a service.
    #[must_use]
    pub fn service(name: impl Into<String>) -> Self {
        Self::new(name, ComponentKind::Service)
    }

    /// Describes a router.
    #[must_use]
    pub fn router(name: impl Into<String>) -> Self {
        Self::new(name, ComponentKind::Router)
    }

    /// Sets the install priority.
    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Appends a route.
    #[must_use]
    pub fn route(mut self, route: RouteDef) -> Self {
        self.routes.push(route);
        self
    }

    /// Declares a hook.
    #[must_use]
    pub fn with_capability(mut self, capability: Capability) -> Self {
        if !self.capabilities.contains(&capability) {
            self.capabilities.push(capability);
        }
        self
    }

    /// Returns `true` if the component declared the hook.
    #[must_use]
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// A service or router instance.
///
/// Hooks take `&self`; components keep injected state behind interior
/// mutability (`OnceLock`, `RwLock`). Hooks only run when the descriptor
/// declares the matching [`Capability`].
pub trait Component: Send + Sync + 'static {
    /// Receives the map of every registered service.
    fn on_injection(&self, _services: &ServiceMap) -> anyhow::Result<()> {
        Ok(())
    }

    /// Receives this component's own copy of the configuration.
    fn on_config(&self, _config: HearthConfig) -> anyhow::Result<()> {
        Ok(())
    }

    /// Resolves a route's handler name.
    fn handler(self: Arc<Self>, _name: &str) -> Option<Handler> {
        None
    }
}

/// A constructed component as produced by discovery.
///
/// Exports without a descriptor are ignored by the registry.
#[derive(Clone)]
pub struct Export {
    pub(crate) descriptor: Option<ComponentDescriptor>,
    pub(crate) component: Arc<dyn Component>,
    pub(crate) instance: Arc<dyn Any + Send + Sync>,
}

impl Export {
    /// Exports a described component.
    pub fn new<T: Component>(descriptor: ComponentDescriptor, component: T) -> Self {
        Self::shared(descriptor, Arc::new(component))
    }

    /// Exports a described component that is already shared.
    pub fn shared<T: Component>(descriptor: ComponentDescriptor, component: Arc<T>) -> Self {
        Self {
            descriptor: Some(descriptor),
            component: Arc::clone(&component) as Arc<dyn Component>,
            instance: component,
        }
    }

    /// Exports a value with no descriptor.
    pub fn unmarked<T: Component>(component: T) -> Self {
        let component = Arc::new(component);
        Self {
            descriptor: None,
            component: Arc::clone(&component) as Arc<dyn Component>,
            instance: component,
        }
    }

    /// Returns the descriptor, if any.
    #[must_use]
    pub const fn descriptor(&self) -> Option<&ComponentDescriptor> {
        self.descriptor.as_ref()
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Export")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Component for Plain {}

    #[test]
    fn test_descriptor_defaults() {
        let desc = ComponentDescriptor::router("albums");
        assert_eq!(desc.kind, ComponentKind::Router);
        assert_eq!(desc.priority, 0);
        assert!(desc.routes.is_empty());
        assert!(!desc.has_capability(Capability::Injection));
    }

    #[test]
    fn test_descriptor_capabilities_dedup() {
        let desc = ComponentDescriptor::service("db")
            .with_capability(Capability::Config)
            .with_capability(Capability::Config);
        assert_eq!(desc.capabilities.len(), 1);
        assert!(desc.has_capability(Capability::Config));
    }

    #[test]
    fn test_route_builders() {
        let route = RouteDef::all("/health", "check");
        assert!(route.method.is_none());

        let route = RouteDef::post("/albums", "create").rule(ValidationRule::query(["dry_run"]));
        assert_eq!(route.method, Some(Method::POST));
        assert_eq!(route.rules.len(), 1);
    }

    #[test]
    fn test_default_handler_resolves_nothing() {
        assert!(Arc::new(Plain).handler("anything").is_none());
    }

    #[test]
    fn test_unmarked_export() {
        let export = Export::unmarked(Plain);
        assert!(export.descriptor().is_none());
    }
}
