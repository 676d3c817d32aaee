//! Structured query keys.
//!
//! A key is an ordered list of segments whose first segment names the
//! resource kind (`games`, `members`, ...). Invalidation matches on segment
//! prefixes, so `["games"]` covers every games list and detail while
//! `["games","list"]` leaves details alone.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One segment of a [`QueryKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum KeySegment {
    /// A literal path-like segment: resource kind, scope name, or id.
    Name(String),
    /// A filter object. Ordered so that equal filters hash equally
    /// regardless of insertion order.
    Params(BTreeMap<String, String>),
}

impl KeySegment {
    fn is_blank(&self) -> bool {
        match self {
            KeySegment::Name(name) => name.trim().is_empty(),
            KeySegment::Params(_) => false,
        }
    }
}

impl From<&str> for KeySegment {
    fn from(value: &str) -> Self {
        KeySegment::Name(value.to_string())
    }
}

impl From<String> for KeySegment {
    fn from(value: String) -> Self {
        KeySegment::Name(value)
    }
}

/// Hierarchical cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QueryKey {
    segments: Vec<KeySegment>,
}

impl QueryKey {
    /// Start a key at a resource kind.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            segments: vec![KeySegment::Name(resource.into())],
        }
    }

    pub fn from_segments(segments: Vec<KeySegment>) -> Self {
        Self { segments }
    }

    /// Append a name segment.
    pub fn push(mut self, segment: impl Into<KeySegment>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append a filter segment built from `(name, value)` pairs.
    pub fn with_params<K, V, I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.segments.push(KeySegment::Params(params));
        self
    }

    pub fn segments(&self) -> &[KeySegment] {
        &self.segments
    }

    /// The resource kind this key is partitioned under.
    pub fn resource(&self) -> Option<&str> {
        match self.segments.first() {
            Some(KeySegment::Name(name)) => Some(name.as_str()),
            _ => None,
        }
    }

    /// True when `prefix`'s segments are a leading run of this key's.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        prefix.segments.len() <= self.segments.len()
            && self.segments.iter().zip(&prefix.segments).all(|(a, b)| a == b)
    }

    /// A key with no segments or any blank name segment (missing id) is
    /// disabled: reads against it are never issued.
    pub fn is_enabled(&self) -> bool {
        !self.segments.is_empty() && !self.segments.iter().any(KeySegment::is_blank)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "{:?}", self.segments),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prefix_matching() {
        let list = QueryKey::new("games").push("list").with_params([("size", "4")]);
        let detail = QueryKey::new("games").push("detail").push("g1");

        assert!(list.starts_with(&QueryKey::new("games")));
        assert!(list.starts_with(&QueryKey::new("games").push("list")));
        assert!(!detail.starts_with(&QueryKey::new("games").push("list")));
        assert!(!list.starts_with(&QueryKey::new("members")));
    }

    #[test]
    fn test_blank_segment_disables_key() {
        assert!(!QueryKey::new("games").push("detail").push("").is_enabled());
        assert!(!QueryKey::new(" ").is_enabled());
        assert!(!QueryKey::from_segments(Vec::new()).is_enabled());
        assert!(QueryKey::new("games").with_params(Vec::<(String, String)>::new()).is_enabled());
    }

    #[test]
    fn test_params_order_independent() {
        let a = QueryKey::new("games").with_params([("genre", "RPG"), ("size", "4")]);
        let b = QueryKey::new("games").with_params([("size", "4"), ("genre", "RPG")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_is_json_array() {
        let key = QueryKey::new("games").push("list").with_params([("size", "4")]);
        assert_eq!(key.to_string(), r#"["games","list",{"size":"4"}]"#);
        assert_eq!(key.resource(), Some("games"));
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-z]{1,6}"
    }

    proptest! {
        #[test]
        fn every_key_starts_with_its_resource(parts in proptest::collection::vec(segment(), 1..5)) {
            let mut key = QueryKey::new(parts[0].clone());
            for part in &parts[1..] {
                key = key.push(part.clone());
            }
            prop_assert!(key.starts_with(&QueryKey::new(parts[0].clone())));
            prop_assert!(key.starts_with(&key));
            prop_assert!(key.is_enabled());
        }

        #[test]
        fn longer_key_never_prefixes_shorter(parts in proptest::collection::vec(segment(), 1..5), extra in segment()) {
            let mut key = QueryKey::new(parts[0].clone());
            for part in &parts[1..] {
                key = key.push(part.clone());
            }
            let longer = key.clone().push(extra);
            prop_assert!(!key.starts_with(&longer));
            prop_assert!(longer.starts_with(&key));
        }
    }
}
