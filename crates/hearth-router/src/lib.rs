//! Radix tree router for Hearth.
//!
//! Maps `(method, path)` to a mounted value. Hearth mounts one middleware
//! chain per route; the router itself is generic.
//!
//! # Features
//!
//! - **Path Parameters**: `/albums/{id}` or `/albums/:id`
//! - **Wildcards**: catch-all tails (`/files/*path`)
//! - **Catch-all Methods**: values mounted for every method
//! - **Mount Order**: when routes overlap, the one mounted first answers
//! - **Duplicate Detection**: a second value for the same `(method, path)` is rejected
//!
//! # Example
//!
//! ```rust
//! use hearth_router::{MethodFilter, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert(MethodFilter::Only(Method::GET), "/albums/:id", "show").unwrap();
//! router.insert(MethodFilter::Any, "/files/*path", "files").unwrap();
//!
//! let matched = router.at(&Method::GET, "/files/covers/7.png").unwrap();
//! assert_eq!(*matched.value, "files");
//! assert_eq!(matched.params.get("path"), Some("covers/7.png"));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!              │               │
//!           "albums"        "files"
//!              │               │
//!        ┌─────┴─────┐      "*path"
//!        │           │       [ALL]
//!      [GET]       "{id}"
//!                    │
//!                  [GET]
//! ```

mod method_router;
mod node;
mod params;
mod router;

pub use method_router::{MethodFilter, MethodRouter};
pub use node::{Node, SegmentKind};
pub use params::Params;
pub use router::Router;

use thiserror::Error;

/// A matched route with its value and captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The mounted value.
    pub value: &'a T,
    /// Captured path parameters.
    pub params: Params,
}

/// Errors raised while mounting a route.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouteError {
    /// The `(method, path)` pair is already mounted.
    #[error("a route for {filter} is already mounted on this path")]
    Duplicate {
        /// The taken method filter.
        filter: MethodFilter,
    },

    /// A wildcard segment was followed by more segments.
    #[error("wildcard must be the last segment in {path}")]
    WildcardNotLast {
        /// The offending pattern.
        path: String,
    },

    /// A parameter or wildcard has no name.
    #[error("unnamed parameter in {path}")]
    UnnamedSegment {
        /// The offending pattern.
        path: String,
    },

    /// A parameter name differs from one already mounted at the same position.
    #[error("parameter {new} in {path} conflicts with {existing}")]
    ParamConflict {
        /// The offending pattern.
        path: String,
        /// The segment already mounted.
        existing: String,
        /// The segment being mounted.
        new: String,
    },
}

impl RouteError {
    pub(crate) const fn duplicate(filter: MethodFilter) -> Self {
        Self::Duplicate { filter }
    }
}
