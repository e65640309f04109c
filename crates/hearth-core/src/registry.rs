//! Component discovery and registration.
//!
//! Discovery hands the [`Registry`] a list of [`DiscoveryUnit`]s. Each unit has
//! an `origin` (a module path, file name, or any stable label) and a loader
//! that constructs the unit's exports. Units are loaded in lexicographic order
//! of their origin so collision resolution does not depend on how they were
//! collected.
//!
//! After registration the registry is frozen into a [`RegistrySnapshot`], the
//! read-only view used by injection and route installation.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::component::{Component, ComponentDescriptor, ComponentKind, Export};

/// A registered component.
#[derive(Clone)]
pub struct Registered {
    /// The component's descriptor.
    pub descriptor: ComponentDescriptor,
    /// The component, for hooks and handler resolution.
    pub component: Arc<dyn Component>,
    instance: Arc<dyn Any + Send + Sync>,
}

impl Registered {
    /// Returns the component name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

impl std::fmt::Debug for Registered {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registered")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Outcome of [`Registry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The export had no descriptor.
    Ignored,
    /// The name was new in its namespace.
    Registered,
    /// An earlier component with the same name was replaced.
    Replaced,
}

type Loader = Box<dyn FnOnce() -> anyhow::Result<Vec<Export>> + Send>;

/// A source of exports, such as one module of an application.
pub struct DiscoveryUnit {
    origin: String,
    loader: Loader,
}

impl DiscoveryUnit {
    /// Creates a unit from a fallible constructor.
    pub fn new<F>(origin: impl Into<String>, loader: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<Vec<Export>> + Send + 'static,
    {
        Self {
            origin: origin.into(),
            loader: Box::new(loader),
        }
    }

    /// Creates a unit from already-built exports.
    pub fn from_exports(origin: impl Into<String>, exports: Vec<Export>) -> Self {
        Self::new(origin, move || Ok(exports))
    }

    /// Returns the unit's origin.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }
}

impl std::fmt::Debug for DiscoveryUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryUnit")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// Summary of a discovery pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Origins loaded, in load order.
    pub loaded: Vec<String>,
    /// Origins whose loader failed, with the failure.
    pub failed: Vec<(String, String)>,
    /// Exports without a descriptor.
    pub ignored: usize,
    /// Registrations that replaced an earlier component.
    pub replaced: usize,
}

/// Mutable registry used during discovery.
#[derive(Default)]
pub struct Registry {
    services: IndexMap<String, Registered>,
    routers: IndexMap<String, Registered>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one export.
    ///
    /// A later registration under an existing name replaces the earlier one
    /// and keeps its position.
    pub fn register(&mut self, export: Export) -> Registration {
        let Export {
            descriptor,
            component,
            instance,
        } = export;

        let Some(descriptor) = descriptor else {
            return Registration::Ignored;
        };

        let kind = descriptor.kind;
        let name = descriptor.name.clone();
        let map = match kind {
            ComponentKind::Service => &mut self.services,
            ComponentKind::Router => &mut self.routers,
        };

        let entry = Registered {
            descriptor,
            component,
            instance,
        };

        if map.insert(name.clone(), entry).is_some() {
            warn!(component = %name, kind = %kind, "component replaced by later registration");
            Registration::Replaced
        } else {
            debug!(component = %name, kind = %kind, "component registered");
            Registration::Registered
        }
    }

    /// Loads and registers every unit, in lexicographic order of origin.
    ///
    /// A unit whose loader fails or panics is skipped; the rest still load.
    pub fn discover(&mut self, mut units: Vec<DiscoveryUnit>) -> DiscoveryReport {
        units.sort_by(|a, b| a.origin.cmp(&b.origin));

        let mut report = DiscoveryReport::default();

        for unit in units {
            let DiscoveryUnit { origin, loader } = unit;

            let exports = match catch_unwind(AssertUnwindSafe(loader)) {
                Ok(Ok(exports)) => exports,
                Ok(Err(err)) => {
                    warn!(origin = %origin, error = %err, "discovery unit failed, skipping");
                    report.failed.push((origin, err.to_string()));
                    continue;
                }
                Err(_) => {
                    warn!(origin = %origin, "discovery unit panicked, skipping");
                    report.failed.push((origin, "loader panicked".to_string()));
                    continue;
                }
            };

            for export in exports {
                match self.register(export) {
                    Registration::Ignored => report.ignored += 1,
                    Registration::Replaced => report.replaced += 1,
                    Registration::Registered => {}
                }
            }
            report.loaded.push(origin);
        }

        report
    }

    /// Returns the number of services.
    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Returns the number of routers.
    #[must_use]
    pub fn router_count(&self) -> usize {
        self.routers.len()
    }

    /// Freezes the registry.
    #[must_use]
    pub fn freeze(self) -> RegistrySnapshot {
        let service_map = ServiceMap {
            services: Arc::new(
                self.services
                    .iter()
                    .map(|(name, entry)| (name.clone(), Arc::clone(&entry.instance)))
                    .collect(),
            ),
        };

        RegistrySnapshot {
            services: Arc::new(self.services),
            routers: Arc::new(self.routers),
            service_map,
        }
    }
}

/// Read-only view of every registered component.
#[derive(Clone, Debug)]
pub struct RegistrySnapshot {
    services: Arc<IndexMap<String, Registered>>,
    routers: Arc<IndexMap<String, Registered>>,
    service_map: ServiceMap,
}

impl RegistrySnapshot {
    /// Services in registration order.
    pub fn services(&self) -> impl Iterator<Item = &Registered> {
        self.services.values()
    }

    /// Routers in registration order.
    pub fn routers(&self) -> impl Iterator<Item = &Registered> {
        self.routers.values()
    }

    /// Looks up a service.
    #[must_use]
    pub fn service(&self, name: &str) -> Option<&Registered> {
        self.services.get(name)
    }

    /// Looks up a router.
    #[must_use]
    pub fn router(&self, name: &str) -> Option<&Registered> {
        self.routers.get(name)
    }

    /// Returns the shared service map.
    #[must_use]
    pub fn service_map(&self) -> &ServiceMap {
        &self.service_map
    }
}

/// Every registered service, by name.
///
/// Passed to [`Component::on_injection`].
#[derive(Clone, Default)]
pub struct ServiceMap {
    services: Arc<IndexMap<String, Arc<dyn Any + Send + Sync>>>,
}

impl ServiceMap {
    /// Returns a service as its concrete type.
    ///
    /// Returns `None` if no service has that name or it has another type.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Option<Arc<T>> {
        self.services
            .get(name)
            .and_then(|s| Arc::clone(s).downcast::<T>().ok())
    }

    /// Returns `true` if a service with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    /// Service names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Returns the number of services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if there are no services.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl std::fmt::Debug for ServiceMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.services.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentDescriptor;

    struct Db {
        url: String,
    }
    impl Component for Db {}

    struct Albums;
    impl Component for Albums {}

    #[test]
    fn test_unmarked_export_is_ignored() {
        let mut registry = Registry::new();
        assert_eq!(registry.register(Export::unmarked(Albums)), Registration::Ignored);
        assert_eq!(registry.service_count() + registry.router_count(), 0);
    }

    #[test]
    fn test_kinds_use_separate_namespaces() {
        let mut registry = Registry::new();
        registry.register(Export::new(
            ComponentDescriptor::service("albums"),
            Db { url: "a".into() },
        ));
        let outcome = registry.register(Export::new(ComponentDescriptor::router("albums"), Albums));

        assert_eq!(outcome, Registration::Registered);
        assert_eq!(registry.service_count(), 1);
        assert_eq!(registry.router_count(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        registry.register(Export::new(
            ComponentDescriptor::service("db"),
            Db { url: "first".into() },
        ));
        let outcome = registry.register(Export::new(
            ComponentDescriptor::service("db"),
            Db { url: "second".into() },
        ));
        assert_eq!(outcome, Registration::Replaced);

        let snapshot = registry.freeze();
        let db = snapshot.service_map().get::<Db>("db").unwrap();
        assert_eq!(db.url, "second");
    }

    #[test]
    fn test_discovery_sorts_by_origin() {
        let mut registry = Registry::new();
        let report = registry.discover(vec![
            DiscoveryUnit::from_exports(
                "b/db.rs",
                vec![Export::new(ComponentDescriptor::service("db"), Db { url: "b".into() })],
            ),
            DiscoveryUnit::from_exports(
                "a/db.rs",
                vec![Export::new(ComponentDescriptor::service("db"), Db { url: "a".into() })],
            ),
        ]);

        assert_eq!(report.loaded, vec!["a/db.rs", "b/db.rs"]);
        assert_eq!(report.replaced, 1);

        let snapshot = registry.freeze();
        assert_eq!(snapshot.service_map().get::<Db>("db").unwrap().url, "b");
    }

    #[test]
    fn test_failed_unit_is_skipped() {
        let mut registry = Registry::new();
        let report = registry.discover(vec![
            DiscoveryUnit::new("broken", || Err(anyhow::anyhow!("constructor failed"))),
            DiscoveryUnit::new("panicky", || panic!("boom")),
            DiscoveryUnit::from_exports(
                "ok",
                vec![
                    Export::new(ComponentDescriptor::router("albums"), Albums),
                    Export::unmarked(Albums),
                ],
            ),
        ]);

        assert_eq!(report.loaded, vec!["ok"]);
        assert_eq!(report.failed.len(), 2);
        assert_eq!(report.ignored, 1);
        assert_eq!(registry.router_count(), 1);
    }

    #[test]
    fn test_service_map_type_mismatch() {
        let mut registry = Registry::new();
        registry.register(Export::new(
            ComponentDescriptor::service("db"),
            Db { url: "x".into() },
        ));
        let snapshot = registry.freeze();

        assert!(snapshot.service_map().get::<Albums>("db").is_none());
        assert!(snapshot.service_map().get::<Db>("missing").is_none());
        assert!(snapshot.service_map().contains("db"));
    }

    #[test]
    fn test_snapshot_preserves_order() {
        let mut registry = Registry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry.register(Export::new(ComponentDescriptor::router(name), Albums));
        }
        let snapshot = registry.freeze();
        let names: Vec<_> = snapshot.routers().map(Registered::name).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
