//! Per-path method dispatch.
//!
//! A [`MethodRouter`] holds the values mounted on one path: at most one per
//! HTTP method plus an optional catch-all for routes declared without a
//! method. Every value remembers the order it was mounted in, and lookups
//! return the earliest one that answers the method.

use http::Method;

use crate::RouteError;

/// Which methods a mounted value answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodFilter {
    /// Every method.
    Any,
    /// One method.
    Only(Method),
}

impl MethodFilter {
    /// Builds a filter from an optional method.
    #[must_use]
    pub fn from_option(method: Option<Method>) -> Self {
        method.map_or(Self::Any, Self::Only)
    }
}

impl std::fmt::Display for MethodFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str("ALL"),
            Self::Only(method) => f.write_str(method.as_str()),
        }
    }
}

/// A mounted value with its position in the mount sequence.
#[derive(Debug, Clone)]
struct Slot<T> {
    order: usize,
    value: T,
}

/// Values mounted on a single path, keyed by method.
///
/// When both a method-specific value and the catch-all answer a request, the
/// one mounted first wins.
///
/// # Example
///
/// ```rust
/// use hearth_router::{MethodFilter, MethodRouter};
/// use http::Method;
///
/// let mut methods = MethodRouter::new();
/// methods.insert(MethodFilter::Only(Method::GET), 0, "list").unwrap();
/// methods.insert(MethodFilter::Any, 1, "fallback").unwrap();
///
/// assert_eq!(methods.get(&Method::GET), Some(&"list"));
/// assert_eq!(methods.get(&Method::DELETE), Some(&"fallback"));
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    methods: Vec<(Method, Slot<T>)>,
    any: Option<Slot<T>>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
            any: None,
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mounts a value at position `order` of the mount sequence.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Duplicate`] if the filter is already taken; the
    /// existing value is kept.
    pub fn insert(&mut self, filter: MethodFilter, order: usize, value: T) -> Result<(), RouteError> {
        let slot = Slot { order, value };
        match filter {
            MethodFilter::Any => {
                if self.any.is_some() {
                    return Err(RouteError::duplicate(MethodFilter::Any));
                }
                self.any = Some(slot);
            }
            MethodFilter::Only(method) => {
                if self.methods.iter().any(|(m, _)| *m == method) {
                    return Err(RouteError::duplicate(MethodFilter::Only(method)));
                }
                self.methods.push((method, slot));
            }
        }
        Ok(())
    }

    /// Returns the earliest-mounted value answering a method.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.lookup(method).map(|(_, value)| value)
    }

    /// Like [`get`](Self::get), with the value's mount order.
    pub(crate) fn lookup(&self, method: &Method) -> Option<(usize, &T)> {
        let exact = self
            .methods
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, slot)| slot);

        let slot = match (exact, self.any.as_ref()) {
            (Some(exact), Some(any)) if any.order < exact.order => any,
            (Some(exact), _) => exact,
            (None, any) => any?,
        };
        Some((slot.order, &slot.value))
    }

    /// Returns true if nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty() && self.any.is_none()
    }
}
