//! Route installation.
//!
//! Turns the routers in a frozen registry into mounted chains:
//!
//! 1. Routers are sorted by ascending priority; ties keep registration order.
//! 2. Each route's handler name is resolved on its router.
//! 3. The chain is assembled as `[request log] → [validation] → handler`,
//!    with the request log only under `server.verbose_logs` and validation
//!    only when the route declares rules.
//! 4. The chain is mounted on the binder under `(method or all, path)`.
//!
//! Defective declarations never abort startup: a router without routes, a
//! route with an empty path or handler name, an unresolved handler, or a
//! mount the binder rejects is logged at warn and skipped. The not-found and
//! error responders are mounted last.

use std::sync::Arc;

use hearth_config::HearthConfig;
use hearth_core::{Registered, RegistrySnapshot, RouteDef};
use hearth_middleware::stages::{RequestLogMiddleware, ValidationMiddleware};
use hearth_middleware::RouteChain;
use hearth_router::MethodFilter;
use tracing::{debug, info, warn};

use crate::responders;
use crate::route_table::TransportBinder;

/// A route that was mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledRoute {
    /// Owning router.
    pub router: String,
    /// Method filter.
    pub method: MethodFilter,
    /// Path pattern.
    pub path: String,
    /// Handler name.
    pub handler: String,
}

/// Summary of an installation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Mounted routes, in mount order.
    pub installed: Vec<InstalledRoute>,
    /// Routers skipped for declaring no routes.
    pub empty_routers: Vec<String>,
    /// Routes skipped, as `(router, reason)`.
    pub skipped: Vec<(String, String)>,
}

impl InstallReport {
    /// Returns the router names in the order their first route was mounted.
    #[must_use]
    pub fn router_order(&self) -> Vec<&str> {
        let mut order: Vec<&str> = Vec::new();
        for route in &self.installed {
            if order.last() != Some(&route.router.as_str()) {
                order.push(&route.router);
            }
        }
        order
    }
}

/// Installs every router in `registry` on `binder`.
pub fn install<B: TransportBinder>(
    registry: &RegistrySnapshot,
    config: &HearthConfig,
    binder: &mut B,
) -> InstallReport {
    let mut routers: Vec<&Registered> = registry.routers().collect();
    routers.sort_by_key(|r| r.descriptor.priority);

    let mut report = InstallReport::default();

    for router in routers {
        if router.descriptor.routes.is_empty() {
            warn!(router = router.name(), "router declares no routes, skipping");
            report.empty_routers.push(router.name().to_string());
            continue;
        }

        for route in &router.descriptor.routes {
            match install_route(router, route, config, binder) {
                Ok(installed) => report.installed.push(installed),
                Err(reason) => {
                    warn!(
                        router = router.name(),
                        path = %route.path,
                        handler = %route.handler,
                        reason = %reason,
                        "skipping route"
                    );
                    report.skipped.push((router.name().to_string(), reason));
                }
            }
        }
    }

    binder.mount_not_found(responders::not_found());
    binder.mount_error(responders::internal_error());

    info!(
        routes = report.installed.len(),
        skipped = report.skipped.len(),
        "routes installed"
    );
    report
}

fn install_route<B: TransportBinder>(
    router: &Registered,
    route: &RouteDef,
    config: &HearthConfig,
    binder: &mut B,
) -> Result<InstalledRoute, String> {
    if route.path.is_empty() {
        return Err("route has no path".to_string());
    }
    if route.handler.is_empty() {
        return Err("route has no handler name".to_string());
    }

    let handler = Arc::clone(&router.component)
        .handler(&route.handler)
        .ok_or_else(|| format!("handler '{}' not found on router", route.handler))?;

    let mut chain = RouteChain::new(handler);
    if config.server.verbose_logs {
        chain.push(Arc::new(RequestLogMiddleware::new(&route.path)));
    }
    if !route.rules.is_empty() {
        chain.push(Arc::new(ValidationMiddleware::new(&route.path, route.rules.clone())));
    }

    let method = MethodFilter::from_option(route.method.clone());
    debug!(
        router = router.name(),
        method = %method,
        path = %route.path,
        stages = ?chain.stage_names(),
        "mounting route"
    );
    binder
        .mount(method.clone(), &route.path, chain)
        .map_err(|e| e.to_string())?;

    Ok(InstalledRoute {
        router: router.name().to_string(),
        method,
        path: route.path.clone(),
        handler: route.handler.clone(),
    })
}
