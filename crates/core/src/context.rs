//! Layered context for capability invocations.
//!
//! A [`ContextStore`] is the shared, lowest-precedence layer. It is an
//! explicit object handed to every capability that needs it, not a
//! process global. A [`ContextFrame`] stacks maps so later layers
//! override earlier ones.

use serde_json::{Map, Value};
use std::sync::RwLock;

/// A flat key/value context map.
pub type ContextMap = Map<String, Value>;

/// Shared mutable key/value context.
///
/// Writes are last-writer-wins with no ordering guarantee between
/// concurrent `set`/`merge` calls.
#[derive(Debug, Default)]
pub struct ContextStore {
    values: RwLock<ContextMap>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with `values`.
    pub fn with_values(values: ContextMap) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.write().insert(key.into(), value);
    }

    /// Shallow-overwrite every key in `partial`.
    pub fn merge(&self, partial: ContextMap) {
        let mut values = self.write();
        for (key, value) in partial {
            values.insert(key, value);
        }
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> ContextMap {
        self.read().clone()
    }

    // A poisoned lock still holds a usable map; keep serving it.
    fn read(&self) -> std::sync::RwLockReadGuard<'_, ContextMap> {
        self.values.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ContextMap> {
        self.values.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// An ordered stack of context maps, lowest precedence first.
#[derive(Debug, Clone, Default)]
pub struct ContextFrame {
    layers: Vec<ContextMap>,
}

impl ContextFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer that overrides everything already in the frame.
    pub fn layer(mut self, map: ContextMap) -> Self {
        self.layers.push(map);
        self
    }

    /// Flatten all layers; later layers win on key conflicts.
    pub fn merged(&self) -> ContextMap {
        let mut out = ContextMap::new();
        for layer in &self.layers {
            for (key, value) in layer {
                out.insert(key.clone(), value.clone());
            }
        }
        out
    }
}

/// Convert a JSON value into a context map; non-objects yield an empty map.
pub fn as_context_map(value: Value) -> ContextMap {
    match value {
        Value::Object(map) => map,
        _ => ContextMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_get_set_merge_clear() {
        let store = ContextStore::new();
        store.set("language", json!("en"));
        assert_eq!(store.get("language"), Some(json!("en")));

        store.merge(as_context_map(json!({"language": "ja", "style": "shonen"})));
        assert_eq!(store.get("language"), Some(json!("ja")));
        assert_eq!(store.get("style"), Some(json!("shonen")));

        store.clear();
        assert!(store.get("language").is_none());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn frame_precedence_call_over_config_over_global() {
        let global = as_context_map(json!({"a": 1}));
        let config = as_context_map(json!({"a": 2, "b": 1}));
        let call = as_context_map(json!({"a": 3}));

        let merged = ContextFrame::new()
            .layer(global)
            .layer(config)
            .layer(call)
            .merged();

        assert_eq!(Value::Object(merged), json!({"a": 3, "b": 1}));
    }

    #[test]
    fn non_object_becomes_empty_map() {
        assert!(as_context_map(json!([1, 2])).is_empty());
        assert!(as_context_map(Value::Null).is_empty());
    }
}
