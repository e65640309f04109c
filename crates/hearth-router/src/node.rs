//! Radix tree node implementation.
//!
//! Paths are split on `/` and each segment becomes a node. A node has sorted
//! static children, at most one parameter child and at most one wildcard
//! child. Every mounted value carries its position in the mount sequence.
//! Matching explores the static, parameter and wildcard branches and returns
//! the earliest-mounted value that answers the request.

use http::Method;

use crate::method_router::{MethodFilter, MethodRouter};
use crate::params::Params;
use crate::RouteError;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal segment (`albums`).
    Static,
    /// Named parameter (`{id}` or `:id`).
    Param(String),
    /// Catch-all for the rest of the path (`*rest`).
    Wildcard(String),
}

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    segment: String,
    kind: SegmentKind,
    methods: Option<MethodRouter<T>>,
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
    wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(segment: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            segment: segment.into(),
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new("", SegmentKind::Static)
    }

    /// Mounts a value on a path pattern at position `order` of the mount
    /// sequence.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] for malformed patterns, for a parameter whose
    /// name differs from one already mounted at the same position, and for a
    /// method already taken on the same path.
    pub fn insert(
        &mut self,
        path: &str,
        filter: MethodFilter,
        order: usize,
        value: T,
    ) -> Result<(), RouteError> {
        let segments = parse_path(path)?;
        self.insert_segments(path, &segments, filter, order, value)
    }

    fn insert_segments(
        &mut self,
        path: &str,
        segments: &[(String, SegmentKind)],
        filter: MethodFilter,
        order: usize,
        value: T,
    ) -> Result<(), RouteError> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return self
                .methods
                .get_or_insert_with(MethodRouter::new)
                .insert(filter, order, value);
        };

        match kind {
            SegmentKind::Static => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children
                            .insert(index, Node::new(segment.clone(), SegmentKind::Static));
                        index
                    }
                };
                self.static_children[index].insert_segments(path, remaining, filter, order, value)
            }
            SegmentKind::Param(name) | SegmentKind::Wildcard(name) => {
                let is_param = matches!(kind, SegmentKind::Param(_));
                let slot = if is_param {
                    &mut self.param_child
                } else {
                    &mut self.wildcard_child
                };

                let child = slot.get_or_insert_with(|| Box::new(Node::new(segment.clone(), kind.clone())));
                if child.kind != *kind {
                    return Err(RouteError::ParamConflict {
                        path: path.to_string(),
                        existing: child.segment.clone(),
                        new: segment.clone(),
                    });
                }
                child.insert_segments(path, remaining, filter, order, value)
            }
        }
    }

    /// Matches a path, returning the earliest-mounted value that answers the
    /// method and the parameters captured on its branch.
    #[must_use]
    pub fn match_path(&self, method: &Method, path: &str) -> Option<(&T, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let found = self.match_segments(method, &segments, &Params::new())?;
        Some((found.value, found.params))
    }

    fn match_segments<'a>(
        &'a self,
        method: &Method,
        segments: &[&str],
        params: &Params,
    ) -> Option<Candidate<'a, T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            let (order, value) = self.methods.as_ref()?.lookup(method)?;
            return Some(Candidate {
                order,
                value,
                params: params.clone(),
            });
        };

        let mut best = self
            .find_static_child(segment)
            .and_then(|child| child.match_segments(method, remaining, params));

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                let mut captured = params.clone();
                captured.push(name.clone(), *segment);
                best = earliest(best, child.match_segments(method, remaining, &captured));
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let SegmentKind::Wildcard(name) = &child.kind {
                if let Some((order, value)) = child.methods.as_ref().and_then(|m| m.lookup(method)) {
                    let mut captured = params.clone();
                    captured.push(name.clone(), segments.join("/"));
                    best = earliest(
                        best,
                        Some(Candidate {
                            order,
                            value,
                            params: captured,
                        }),
                    );
                }
            }
        }

        best
    }

    fn find_static_child(&self, segment: &str) -> Option<&Self> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

/// A value that answers a request, with the parameters captured on its branch.
struct Candidate<'a, T> {
    order: usize,
    value: &'a T,
    params: Params,
}

fn earliest<'a, T>(
    current: Option<Candidate<'a, T>>,
    other: Option<Candidate<'a, T>>,
) -> Option<Candidate<'a, T>> {
    match (current, other) {
        (Some(a), Some(b)) => Some(if b.order < a.order { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Splits a pattern into typed segments.
fn parse_path(path: &str) -> Result<Vec<(String, SegmentKind)>, RouteError> {
    let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut segments = Vec::with_capacity(raw.len());

    for (i, s) in raw.iter().enumerate() {
        let kind = if let Some(name) = s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            SegmentKind::Param(name.to_string())
        } else if let Some(name) = s.strip_prefix(':') {
            SegmentKind::Param(name.to_string())
        } else if let Some(name) = s.strip_prefix('*') {
            if i + 1 != raw.len() {
                return Err(RouteError::WildcardNotLast {
                    path: path.to_string(),
                });
            }
            SegmentKind::Wildcard(name.to_string())
        } else {
            SegmentKind::Static
        };

        if let SegmentKind::Param(name) | SegmentKind::Wildcard(name) = &kind {
            if name.is_empty() {
                return Err(RouteError::UnnamedSegment {
                    path: path.to_string(),
                });
            }
        }

        // Parameters are normalized so `:id` and `{id}` share a node.
        let segment = match &kind {
            SegmentKind::Param(name) => format!("{{{name}}}"),
            _ => (*s).to_string(),
        };
        segments.push((segment, kind));
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Mounts `(path, method, value)` triples in order.
    fn tree(routes: &[(&str, Option<Method>, &'static str)]) -> Node<&'static str> {
        let mut root = Node::root();
        for (order, (path, method, value)) in routes.iter().enumerate() {
            root.insert(path, MethodFilter::from_option(method.clone()), order, *value)
                .unwrap();
        }
        root
    }

    fn get(root: &Node<&'static str>, path: &str) -> Option<(&'static str, Params)> {
        root.match_path(&Method::GET, path).map(|(v, p)| (*v, p))
    }

    #[test]
    fn test_parse_path_kinds() {
        let segments = parse_path("/albums/{id}/:track/*rest").unwrap();
        assert_eq!(segments[0], ("albums".to_string(), SegmentKind::Static));
        assert_eq!(segments[1], ("{id}".to_string(), SegmentKind::Param("id".into())));
        assert_eq!(segments[2], ("{track}".to_string(), SegmentKind::Param("track".into())));
        assert_eq!(segments[3], ("*rest".to_string(), SegmentKind::Wildcard("rest".into())));
    }

    #[test]
    fn test_wildcard_must_be_last() {
        let err = parse_path("/files/*rest/more").unwrap_err();
        assert!(matches!(err, RouteError::WildcardNotLast { .. }));
    }

    #[test]
    fn test_unnamed_param_rejected() {
        assert!(matches!(parse_path("/a/{}"), Err(RouteError::UnnamedSegment { .. })));
        assert!(matches!(parse_path("/a/:"), Err(RouteError::UnnamedSegment { .. })));
    }

    #[test]
    fn test_match_static_and_root() {
        let root = tree(&[
            ("/", Some(Method::GET), "index"),
            ("/albums", Some(Method::GET), "list"),
        ]);

        assert_eq!(get(&root, "/").unwrap().0, "index");
        assert_eq!(get(&root, "/albums/").unwrap().0, "list");
        assert!(get(&root, "/artists").is_none());
    }

    #[test]
    fn test_colon_and_brace_params_share_node() {
        let root = tree(&[
            ("/albums/:id", Some(Method::GET), "show"),
            ("/albums/{id}", Some(Method::DELETE), "remove"),
        ]);

        let (value, params) = get(&root, "/albums/9").unwrap();
        assert_eq!(value, "show");
        assert_eq!(params.get("id"), Some("9"));
        assert!(root.match_path(&Method::DELETE, "/albums/9").is_some());
    }

    #[test]
    fn test_param_name_conflict() {
        let mut root = tree(&[("/albums/{id}", Some(Method::GET), "show")]);
        let err = root
            .insert("/albums/{slug}", MethodFilter::Only(Method::PUT), 1, "edit")
            .unwrap_err();
        assert!(matches!(err, RouteError::ParamConflict { .. }));
    }

    #[test]
    fn test_earlier_static_beats_later_param() {
        let root = tree(&[
            ("/albums/latest", Some(Method::GET), "latest"),
            ("/albums/{id}", Some(Method::GET), "show"),
        ]);

        assert_eq!(get(&root, "/albums/latest").unwrap().0, "latest");
        assert_eq!(get(&root, "/albums/3").unwrap().0, "show");
    }

    #[test]
    fn test_earlier_param_shadows_later_static() {
        let root = tree(&[
            ("/albums/{id}", Some(Method::GET), "show"),
            ("/albums/new", Some(Method::GET), "new"),
        ]);

        let (value, params) = get(&root, "/albums/new").unwrap();
        assert_eq!(value, "show");
        assert_eq!(params.get("id"), Some("new"));
    }

    #[test]
    fn test_earlier_wildcard_shadows_later_param() {
        let root = tree(&[
            ("/files/*path", None, "files"),
            ("/files/{name}", Some(Method::GET), "file"),
        ]);

        let (value, params) = get(&root, "/files/cover.png").unwrap();
        assert_eq!(value, "files");
        assert_eq!(params.get("path"), Some("cover.png"));
        assert_eq!(params.get("name"), None);
    }

    #[test]
    fn test_losing_branch_params_are_dropped() {
        let root = tree(&[
            ("/{kind}/detail", Some(Method::GET), "detail"),
            ("/*rest", Some(Method::GET), "fallback"),
        ]);

        let (value, params) = get(&root, "/albums/other").unwrap();
        assert_eq!(value, "fallback");
        assert_eq!(params.get("kind"), None);
        assert_eq!(params.get("rest"), Some("albums/other"));

        let (value, params) = get(&root, "/albums/detail").unwrap();
        assert_eq!(value, "detail");
        assert_eq!(params.get("rest"), None);
    }

    #[test]
    fn test_method_miss_falls_through_to_next_branch() {
        let root = tree(&[
            ("/files/readme", Some(Method::POST), "upload"),
            ("/files/*path", Some(Method::GET), "serve"),
        ]);

        let (value, params) = get(&root, "/files/readme").unwrap();
        assert_eq!(value, "serve");
        assert_eq!(params.get("path"), Some("readme"));
    }

    #[test]
    fn test_multiple_params() {
        let root = tree(&[("/artists/{artist}/albums/{album}", Some(Method::GET), "track")]);

        let (_, params) = get(&root, "/artists/nina/albums/7").unwrap();
        assert_eq!(params.get("artist"), Some("nina"));
        assert_eq!(params.get("album"), Some("7"));
    }
}
