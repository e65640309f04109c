//! Captured path parameters.

use smallvec::SmallVec;

/// Parameters stored inline before spilling to the heap.
const INLINE_PARAMS: usize = 4;

/// Parameters captured while matching a path, in pattern order.
///
/// # Example
///
/// ```rust
/// use hearth_router::Params;
///
/// let mut params = Params::new();
/// params.push("albumId", "42");
///
/// assert_eq!(params.get("albumId"), Some("42"));
/// assert_eq!(params.get("trackId"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over (name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Converts into owned (name, value) pairs.
    #[must_use]
    pub fn into_vec(self) -> Vec<(String, String)> {
        self.inner.into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        params.push("artist", "nina");
        params.push("album", "7");

        assert_eq!(params.get("artist"), Some("nina"));
        assert_eq!(params.get("album"), Some("7"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_params_into_vec_keeps_order() {
        let mut params = Params::new();
        params.push("a", "1");
        params.push("b", "2");

        assert_eq!(
            params.into_vec(),
            vec![("a".to_string(), "1".to_string()), ("b".to_string(), "2".to_string())]
        );
    }

    #[test]
    fn test_params_spill_past_inline() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key7"), Some("value7"));
        assert_eq!(params.iter().count(), 10);
    }
}
