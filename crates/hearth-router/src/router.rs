//! High-level router API.

use http::Method;

use crate::method_router::MethodFilter;
use crate::node::Node;
use crate::{RouteError, RouteMatch};

/// A radix tree router mapping `(method, path)` to values of type `T`.
///
/// # Example
///
/// ```rust
/// use hearth_router::{MethodFilter, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(MethodFilter::Only(Method::GET), "/albums", "list").unwrap();
/// router.insert(MethodFilter::Only(Method::GET), "/albums/{id}", "show").unwrap();
///
/// let matched = router.at(&Method::GET, "/albums/12").unwrap();
/// assert_eq!(*matched.value, "show");
/// assert_eq!(matched.params.get("id"), Some("12"));
/// ```
///
/// # Route Priority
///
/// When several mounted values match a request, the one mounted first wins,
/// whatever its segment kinds or method filter. Mounting `/albums/{id}`
/// before `/albums/latest` leaves the static route unreachable, and a value
/// mounted for every method shadows a later method-specific one on the same
/// path.
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Mounts a value after everything mounted so far.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] if the pattern is malformed or the
    /// `(method, path)` pair is already taken. The router is unchanged for
    /// duplicates.
    pub fn insert(&mut self, filter: MethodFilter, path: &str, value: T) -> Result<(), RouteError> {
        self.root.insert(path, filter, self.route_count, value)?;
        self.route_count += 1;
        Ok(())
    }

    /// Finds the value for a request.
    #[must_use]
    pub fn at(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        let (value, params) = self.root.match_path(method, path)?;
        Some(RouteMatch { value, params })
    }

    /// Returns the number of mounted values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
