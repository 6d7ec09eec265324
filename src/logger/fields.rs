//! Persistent structured fields.
//!
//! Fields form an immutable singly linked list shared between loggers. Adding a
//! field allocates one node and never touches the parent list, so branching
//! many child loggers off one base is cheap and thread-safe.

use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

struct Node {
    key: String,
    value: Value,
    next: Option<Arc<Node>>,
}

/// Immutable set of key/value fields. Newer entries shadow older ones with the same key.
#[derive(Clone, Default)]
pub struct Fields {
    head: Option<Arc<Node>>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// New field set extended with `key`; `self` is unchanged.
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            head: Some(Arc::new(Node {
                key: key.into(),
                value: value.into(),
                next: self.head.clone(),
            })),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Current value of `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.nodes().find(|n| n.key == key).map(|n| &n.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Effective fields, oldest first, with shadowed entries removed.
    pub fn resolve(&self) -> Vec<(&str, &Value)> {
        let mut seen = HashSet::new();
        let mut out: Vec<(&str, &Value)> = self
            .nodes()
            .filter(|n| seen.insert(n.key.as_str()))
            .map(|n| (n.key.as_str(), &n.value))
            .collect();
        out.reverse();
        out
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.resolve().len()
    }

    fn nodes(&self) -> impl Iterator<Item = &Node> {
        let mut cursor = self.head.as_deref();
        std::iter::from_fn(move || {
            let node = cursor?;
            cursor = node.next.as_deref();
            Some(node)
        })
    }
}

impl Drop for Fields {
    // Unlink uniquely owned nodes iteratively so long chains cannot overflow the stack.
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Debug for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.resolve()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_does_not_mutate_parent() {
        let base = Fields::new().with("request_id", "req-1");
        let child = base.with("user_id", 42);

        assert!(!base.contains_key("user_id"));
        assert_eq!(base.len(), 1);
        assert_eq!(child.get("user_id"), Some(&json!(42)));
        assert_eq!(child.get("request_id"), Some(&json!("req-1")));
    }

    #[test]
    fn test_newer_value_overrides() {
        let fields = Fields::new().with("k", "old").with("other", true).with("k", "new");

        assert_eq!(fields.get("k"), Some(&json!("new")));
        assert_eq!(
            fields.resolve(),
            vec![("other", &json!(true)), ("k", &json!("new"))]
        );
    }

    #[test]
    fn test_siblings_are_independent() {
        let base = Fields::new().with("service", "api");
        let a = base.with("branch", "a");
        let b = base.with("branch", "b");

        assert_eq!(a.get("branch"), Some(&json!("a")));
        assert_eq!(b.get("branch"), Some(&json!("b")));
        assert!(!base.contains_key("branch"));
    }

    #[test]
    fn test_long_chain_drops() {
        let mut fields = Fields::new();
        for i in 0..200_000 {
            fields = fields.with("n", i);
        }
        assert_eq!(fields.get("n"), Some(&json!(199_999)));
        drop(fields);
    }
}
