//! Two-phase injection.
//!
//! Once discovery has finished, [`inject`] wires the registered components:
//!
//! 1. **Services.** Every service, then every router, that declares
//!    [`Capability::Injection`] receives the complete [`ServiceMap`](crate::ServiceMap).
//! 2. **Config.** Every service, then every router, that declares
//!    [`Capability::Config`] receives its own clone of the configuration.
//!
//! Phase 1 finishes for every component before phase 2 starts. Within a phase
//! components are visited in registration order and no dependency graph is
//! computed, so a hook must not rely on another component having been
//! injected already. The first hook error aborts startup.

use hearth_config::HearthConfig;
use tracing::debug;

use crate::component::Capability;
use crate::error::{InjectionPhase, StartupError};
use crate::registry::{Registered, RegistrySnapshot};

/// Runs both injection phases over a frozen registry.
///
/// # Errors
///
/// Returns [`StartupError::Injection`] naming the first component whose hook
/// failed.
pub fn inject(registry: &RegistrySnapshot, config: &HearthConfig) -> Result<(), StartupError> {
    let services = registry.service_map();

    for entry in components(registry) {
        if entry.descriptor.has_capability(Capability::Injection) {
            debug!(component = entry.name(), "injecting services");
            entry.component.on_injection(services).map_err(|e| {
                StartupError::injection(entry.name(), InjectionPhase::Services, e)
            })?;
        }
    }

    for entry in components(registry) {
        if entry.descriptor.has_capability(Capability::Config) {
            debug!(component = entry.name(), "injecting config");
            entry
                .component
                .on_config(config.clone())
                .map_err(|e| StartupError::injection(entry.name(), InjectionPhase::Config, e))?;
        }
    }

    Ok(())
}

fn components(registry: &RegistrySnapshot) -> impl Iterator<Item = &Registered> {
    registry.services().chain(registry.routers())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentDescriptor, Export};
    use crate::registry::Registry;
    use crate::ServiceMap;
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Log = Arc<Mutex<Vec<String>>>;

    struct Probe {
        name: &'static str,
        log: Log,
        seen_services: Mutex<Vec<String>>,
        config: Mutex<Option<HearthConfig>>,
        fail_on_config: bool,
    }

    impl Probe {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Arc::clone(log),
                seen_services: Mutex::new(Vec::new()),
                config: Mutex::new(None),
                fail_on_config: false,
            }
        }
    }

    impl Component for Probe {
        fn on_injection(&self, services: &ServiceMap) -> anyhow::Result<()> {
            self.log.lock().push(format!("inject:{}", self.name));
            *self.seen_services.lock() = services.names().map(str::to_string).collect();
            Ok(())
        }

        fn on_config(&self, mut config: HearthConfig) -> anyhow::Result<()> {
            self.log.lock().push(format!("config:{}", self.name));
            if self.fail_on_config {
                anyhow::bail!("bad config for {}", self.name);
            }
            config.server.port = 1;
            config.app.insert("touched_by".into(), self.name.into());
            *self.config.lock() = Some(config);
            Ok(())
        }
    }

    fn both() -> fn(ComponentDescriptor) -> ComponentDescriptor {
        |d| {
            d.with_capability(Capability::Injection)
                .with_capability(Capability::Config)
        }
    }

    #[test]
    fn test_phase_one_completes_before_phase_two() {
        let log: Log = Arc::default();
        let with = both();

        let mut registry = Registry::new();
        registry.register(Export::new(with(ComponentDescriptor::service("a")), Probe::new("a", &log)));
        registry.register(Export::new(with(ComponentDescriptor::router("r")), Probe::new("r", &log)));
        registry.register(Export::new(with(ComponentDescriptor::service("b")), Probe::new("b", &log)));

        inject(&registry.freeze(), &HearthConfig::default()).unwrap();

        assert_eq!(
            *log.lock(),
            vec!["inject:a", "inject:b", "inject:r", "config:a", "config:b", "config:r"]
        );
    }

    #[test]
    fn test_injection_sees_every_service() {
        let log: Log = Arc::default();
        let first = Arc::new(Probe::new("first", &log));

        let mut registry = Registry::new();
        registry.register(Export::shared(
            ComponentDescriptor::service("first").with_capability(Capability::Injection),
            Arc::clone(&first),
        ));
        registry.register(Export::new(ComponentDescriptor::service("later"), Probe::new("later", &log)));

        inject(&registry.freeze(), &HearthConfig::default()).unwrap();

        assert_eq!(*first.seen_services.lock(), vec!["first", "later"]);
    }

    #[test]
    fn test_hooks_skipped_without_capability() {
        let log: Log = Arc::default();
        let mut registry = Registry::new();
        registry.register(Export::new(ComponentDescriptor::service("quiet"), Probe::new("quiet", &log)));

        inject(&registry.freeze(), &HearthConfig::default()).unwrap();
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_config_copies_are_isolated() {
        let log: Log = Arc::default();
        let a = Arc::new(Probe::new("a", &log));
        let b = Arc::new(Probe::new("b", &log));

        let mut registry = Registry::new();
        for (name, probe) in [("a", &a), ("b", &b)] {
            registry.register(Export::shared(
                ComponentDescriptor::service(name).with_capability(Capability::Config),
                Arc::clone(probe),
            ));
        }

        let config = HearthConfig::builder().app_value("shared", "value").build();
        inject(&registry.freeze(), &config).unwrap();

        let b_config = b.config.lock().clone().unwrap();
        assert_eq!(b_config.app["touched_by"], "b");
        assert_eq!(b_config.app["shared"], "value");
        assert_eq!(config.server.port, 8080);
        assert!(!config.app.contains_key("touched_by"));
    }

    #[test]
    fn test_hook_error_is_fatal() {
        let log: Log = Arc::default();
        let mut failing = Probe::new("broken", &log);
        failing.fail_on_config = true;

        let mut registry = Registry::new();
        registry.register(Export::new(
            ComponentDescriptor::service("broken").with_capability(Capability::Config),
            failing,
        ));
        registry.register(Export::new(
            ComponentDescriptor::service("after").with_capability(Capability::Config),
            Probe::new("after", &log),
        ));

        let err = inject(&registry.freeze(), &HearthConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StartupError::Injection { ref component, phase: InjectionPhase::Config, .. } if component == "broken"
        ));
        assert_eq!(*log.lock(), vec!["config:broken"]);
    }
}
