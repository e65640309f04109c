//! Declarative request validation.
//!
//! Routes carry an ordered list of [`ValidationRule`]s. Each rule inspects one
//! part of the request:
//!
//! | Rule | Checks |
//! |------|--------|
//! | [`ValidationRule::Header`] | named headers equal expected values (trimmed, case-insensitive) |
//! | [`ValidationRule::Query`] | named query parameters are present |
//! | [`ValidationRule::Body`] | a predicate tree mirrored against the JSON body |
//! | [`ValidationRule::Custom`] | a predicate over the whole request |
//!
//! Evaluation is pure. Rules run in declared order and the first failure wins.
//!
//! # Example
//!
//! ```
//! use hearth_core::validation::{evaluate_all, BodySchema, Outcome, ValidationRule};
//! use hearth_core::RequestContext;
//! use http::Method;
//! use serde_json::json;
//!
//! let rules = vec![
//!     ValidationRule::query(["page"]),
//!     ValidationRule::body(
//!         BodySchema::new().nested("release", BodySchema::new().field("year", |v| v.is_number())),
//!     ),
//! ];
//!
//! let ctx = RequestContext::new(Method::POST, "/albums")
//!     .with_query("page", "")
//!     .with_body(json!({ "release": { "year": "2020" } }));
//!
//! assert_eq!(
//!     evaluate_all(&rules, &ctx),
//!     Outcome::Fail("Invalid property \"release.year\" on body!".to_string())
//! );
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::RequestContext;

/// Predicate applied to one body value.
pub type ValuePredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Predicate applied to a whole request.
pub type RequestPredicate = Arc<dyn Fn(&RequestContext) -> bool + Send + Sync>;

/// Result of evaluating a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The request satisfied the rule.
    Pass,
    /// The request violated the rule.
    Fail(String),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Pass`].
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// A node in a body validation tree.
#[derive(Clone)]
pub enum BodyValidator {
    /// Predicate over the value at this key.
    Leaf(ValuePredicate),
    /// Nested object checked key-by-key.
    Nested(BodySchema),
}

impl fmt::Debug for BodyValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(_) => f.write_str("Leaf(..)"),
            Self::Nested(schema) => f.debug_tuple("Nested").field(schema).finish(),
        }
    }
}

/// Ordered mapping from body keys to validators.
#[derive(Debug, Clone, Default)]
pub struct BodySchema {
    fields: IndexMap<String, BodyValidator>,
}

impl BodySchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a leaf predicate for `key`.
    #[must_use]
    pub fn field<F>(mut self, key: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.fields
            .insert(key.into(), BodyValidator::Leaf(Arc::new(predicate)));
        self
    }

    /// Adds a nested schema for `key`.
    #[must_use]
    pub fn nested(mut self, key: impl Into<String>, schema: BodySchema) -> Self {
        self.fields.insert(key.into(), BodyValidator::Nested(schema));
        self
    }

    /// Returns the number of direct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    // Returns the dotted path of the first failing entry.
    fn first_failure(&self, object: &Map<String, Value>, prefix: &str) -> Option<String> {
        for (key, validator) in &self.fields {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            let value = object.get(key);

            match validator {
                BodyValidator::Leaf(predicate) => {
                    if !predicate(value.unwrap_or(&Value::Null)) {
                        return Some(path);
                    }
                }
                BodyValidator::Nested(schema) => match value {
                    Some(Value::Object(inner)) => {
                        if let Some(failed) = schema.first_failure(inner, &path) {
                            return Some(failed);
                        }
                    }
                    _ => return Some(path),
                },
            }
        }
        None
    }
}

/// A declarative check attached to a route.
#[derive(Clone)]
pub enum ValidationRule {
    /// Header name to expected value.
    Header(IndexMap<String, String>),
    /// Required query parameter names.
    Query(Vec<String>),
    /// Body predicate tree.
    Body(BodySchema),
    /// Predicate over the whole request.
    Custom(RequestPredicate),
}

impl ValidationRule {
    /// Creates a header rule.
    #[must_use]
    pub fn header<I, K, V>(expected: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Header(
            expected
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Creates a query rule.
    #[must_use]
    pub fn query<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Query(names.into_iter().map(Into::into).collect())
    }

    /// Creates a body rule.
    #[must_use]
    pub const fn body(schema: BodySchema) -> Self {
        Self::Body(schema)
    }

    /// Creates a custom rule.
    #[must_use]
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&RequestContext) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Returns the rule's kind, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Header(_) => "header",
            Self::Query(_) => "query",
            Self::Body(_) => "body",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Debug for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(expected) => f.debug_tuple("Header").field(expected).finish(),
            Self::Query(names) => f.debug_tuple("Query").field(names).finish(),
            Self::Body(schema) => f.debug_tuple("Body").field(schema).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Evaluates one rule against a request.
#[must_use]
pub fn evaluate(rule: &ValidationRule, ctx: &RequestContext) -> Outcome {
    match rule {
        ValidationRule::Header(expected) => {
            for (name, want) in expected {
                let matches = ctx
                    .header(name)
                    .is_some_and(|actual| normalize(actual) == normalize(want));
                if !matches {
                    return Outcome::Fail(format!("Invalid header \"{name}\" on headers!"));
                }
            }
            Outcome::Pass
        }
        ValidationRule::Query(names) => {
            for name in names {
                if !ctx.query_map().contains_key(name) {
                    return Outcome::Fail(format!("Missing parameter \"{name}\" on query!"));
                }
            }
            Outcome::Pass
        }
        ValidationRule::Body(schema) => match ctx.body() {
            Some(Value::Object(object)) => match schema.first_failure(object, "") {
                Some(path) => Outcome::Fail(format!("Invalid property \"{path}\" on body!")),
                None => Outcome::Pass,
            },
            _ => Outcome::Fail("Body must be a JSON object!".to_string()),
        },
        ValidationRule::Custom(predicate) => {
            if predicate(ctx) {
                Outcome::Pass
            } else {
                Outcome::Fail("Request failed custom validation!".to_string())
            }
        }
    }
}

/// Evaluates rules in order, stopping at the first failure.
#[must_use]
pub fn evaluate_all(rules: &[ValidationRule], ctx: &RequestContext) -> Outcome {
    rules
        .iter()
        .map(|rule| evaluate(rule, ctx))
        .find(|outcome| !outcome.is_pass())
        .unwrap_or(Outcome::Pass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request() -> RequestContext {
        RequestContext::new(Method::POST, "/albums")
    }

    #[test]
    fn test_header_rule_normalizes() {
        let rule = ValidationRule::header([("x", "A")]);

        assert!(evaluate(&rule, &request().with_header("x", " a ")).is_pass());
        assert_eq!(
            evaluate(&rule, &request().with_header("x", "b")),
            Outcome::Fail("Invalid header \"x\" on headers!".to_string())
        );
    }

    #[test]
    fn test_header_rule_missing_header_fails() {
        let rule = ValidationRule::header([("x-api-key", "secret")]);
        assert!(!evaluate(&rule, &request()).is_pass());
    }

    #[test]
    fn test_query_rule_presence_only() {
        let rule = ValidationRule::query(["page", "size"]);

        let ctx = request().with_query("page", "").with_query("size", "10");
        assert!(evaluate(&rule, &ctx).is_pass());

        let ctx = request().with_query("page", "1");
        assert_eq!(
            evaluate(&rule, &ctx),
            Outcome::Fail("Missing parameter \"size\" on query!".to_string())
        );
    }

    #[test]
    fn test_body_rule_nested_path() {
        let rule = ValidationRule::body(
            BodySchema::new().nested("release", BodySchema::new().field("year", Value::is_number)),
        );

        let ok = request().with_body(json!({ "release": { "year": 2020 } }));
        assert!(evaluate(&rule, &ok).is_pass());

        let bad = request().with_body(json!({ "release": { "year": "2020" } }));
        assert_eq!(
            evaluate(&rule, &bad),
            Outcome::Fail("Invalid property \"release.year\" on body!".to_string())
        );
    }

    #[test]
    fn test_body_rule_requires_object() {
        let rule = ValidationRule::body(BodySchema::new().field("name", Value::is_string));

        for body in [json!([1, 2]), json!("text"), json!(3)] {
            assert_eq!(
                evaluate(&rule, &request().with_body(body)),
                Outcome::Fail("Body must be a JSON object!".to_string())
            );
        }
        assert!(!evaluate(&rule, &request()).is_pass());
    }

    #[test]
    fn test_body_rule_missing_value_reaches_predicate_as_null() {
        let optional = ValidationRule::body(
            BodySchema::new().field("tag", |v| v.is_null() || v.is_string()),
        );
        assert!(evaluate(&optional, &request().with_body(json!({}))).is_pass());

        let required = ValidationRule::body(BodySchema::new().field("tag", Value::is_string));
        assert!(!evaluate(&required, &request().with_body(json!({}))).is_pass());
    }

    #[test]
    fn test_body_rule_subtree_on_non_object() {
        let rule = ValidationRule::body(
            BodySchema::new().nested("release", BodySchema::new().field("year", Value::is_number)),
        );
        let ctx = request().with_body(json!({ "release": 2020 }));
        assert_eq!(
            evaluate(&rule, &ctx),
            Outcome::Fail("Invalid property \"release\" on body!".to_string())
        );
    }

    #[test]
    fn test_body_rule_reports_first_failure_in_declared_order() {
        let rule = ValidationRule::body(
            BodySchema::new()
                .field("title", Value::is_string)
                .field("artist", Value::is_string),
        );
        let ctx = request().with_body(json!({ "artist": 1, "title": 2 }));
        assert_eq!(
            evaluate(&rule, &ctx),
            Outcome::Fail("Invalid property \"title\" on body!".to_string())
        );
    }

    #[test]
    fn test_custom_rule() {
        let rule = ValidationRule::custom(|ctx| ctx.method() == Method::POST);
        assert!(evaluate(&rule, &request()).is_pass());

        let get = RequestContext::new(Method::GET, "/albums");
        assert_eq!(
            evaluate(&rule, &get),
            Outcome::Fail("Request failed custom validation!".to_string())
        );
    }

    #[test]
    fn test_evaluate_all_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let rules = vec![
            ValidationRule::query(["missing"]),
            ValidationRule::custom(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            }),
        ];

        assert!(!evaluate_all(&rules, &request()).is_pass());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_evaluate_all_empty_passes() {
        assert_eq!(evaluate_all(&[], &request()), Outcome::Pass);
    }

    proptest! {
        #[test]
        fn prop_header_match_ignores_case_and_padding(
            value in "[a-zA-Z0-9]{1,16}",
            left in 0usize..4,
            right in 0usize..4,
            upper in any::<bool>(),
        ) {
            let sent = if upper { value.to_uppercase() } else { value.to_lowercase() };
            let sent = format!("{}{}{}", " ".repeat(left), sent, " ".repeat(right));

            let rule = ValidationRule::header([("x-token", value.as_str())]);
            let ctx = request().with_header("x-token", &sent);
            prop_assert!(evaluate(&rule, &ctx).is_pass());
        }

        #[test]
        fn prop_header_mismatch_fails(value in "[a-z]{1,8}", other in "[a-z]{1,8}") {
            prop_assume!(value != other);
            let rule = ValidationRule::header([("x-token", value.as_str())]);
            let ctx = request().with_header("x-token", &other);
            prop_assert!(!evaluate(&rule, &ctx).is_pass());
        }
    }
}
