//! Variable to block bindings
//!
//! One variable may bind to several blocks. The store keeps each variable's
//! blocks in insertion order without duplicates. It does not stop two
//! variables from claiming the same block; [`BindingStore::owners_of`] lets
//! callers detect that.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindingStore {
    bindings: BTreeMap<String, Vec<String>>,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `block_id` to `variable_id`
    ///
    /// Returns `false` when the pair already existed.
    pub fn bind(&mut self, variable_id: &str, block_id: &str) -> bool {
        let blocks = self.bindings.entry(variable_id.to_string()).or_default();
        if blocks.iter().any(|b| b == block_id) {
            return false;
        }
        blocks.push(block_id.to_string());
        true
    }

    /// Remove one pair. Returns `false` when it was not bound.
    pub fn unbind(&mut self, variable_id: &str, block_id: &str) -> bool {
        let Some(blocks) = self.bindings.get_mut(variable_id) else {
            return false;
        };
        let before = blocks.len();
        blocks.retain(|b| b != block_id);
        let removed = blocks.len() != before;
        if blocks.is_empty() {
            self.bindings.remove(variable_id);
        }
        removed
    }

    /// Drop every binding of a variable, returning the blocks it held
    pub fn unbind_all(&mut self, variable_id: &str) -> Vec<String> {
        self.bindings.remove(variable_id).unwrap_or_default()
    }

    pub fn blocks_for(&self, variable_id: &str) -> &[String] {
        self.bindings
            .get(variable_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First block bound to a variable, used when a single anchor is needed
    pub fn primary_block(&self, variable_id: &str) -> Option<&str> {
        self.blocks_for(variable_id).first().map(String::as_str)
    }

    pub fn is_bound(&self, variable_id: &str, block_id: &str) -> bool {
        self.blocks_for(variable_id).iter().any(|b| b == block_id)
    }

    /// Every variable currently claiming `block_id`
    pub fn owners_of(&self, block_id: &str) -> Vec<&str> {
        self.bindings
            .iter()
            .filter(|(_, blocks)| blocks.iter().any(|b| b == block_id))
            .map(|(variable, _)| variable.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.bindings
            .iter()
            .map(|(variable, blocks)| (variable.as_str(), blocks.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_is_idempotent() {
        let mut store = BindingStore::new();
        assert!(store.bind("v1", "b1"));
        assert!(!store.bind("v1", "b1"));
        assert_eq!(store.blocks_for("v1"), ["b1".to_string()]);
    }

    #[test]
    fn test_unbind_twice_is_safe() {
        let mut store = BindingStore::new();
        store.bind("v1", "b1");
        assert!(store.unbind("v1", "b1"));
        assert!(!store.unbind("v1", "b1"));
        assert!(store.blocks_for("v1").is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_unbind_unknown_variable() {
        let mut store = BindingStore::new();
        assert!(!store.unbind("ghost", "b1"));
    }

    #[test]
    fn test_blocks_keep_insertion_order() {
        let mut store = BindingStore::new();
        store.bind("v1", "b3");
        store.bind("v1", "b1");
        store.bind("v1", "b2");
        assert_eq!(store.blocks_for("v1"), ["b3", "b1", "b2"].map(String::from));
        assert_eq!(store.primary_block("v1"), Some("b3"));

        store.unbind("v1", "b3");
        assert_eq!(store.primary_block("v1"), Some("b1"));
    }

    #[test]
    fn test_unbind_all_returns_blocks() {
        let mut store = BindingStore::new();
        store.bind("v1", "b1");
        store.bind("v1", "b2");
        store.bind("v2", "b3");

        assert_eq!(store.unbind_all("v1"), vec!["b1".to_string(), "b2".to_string()]);
        assert!(store.blocks_for("v1").is_empty());
        assert_eq!(store.blocks_for("v2"), ["b3".to_string()]);
        assert!(store.unbind_all("v1").is_empty());
    }

    #[test]
    fn test_owners_of_detects_collisions() {
        let mut store = BindingStore::new();
        store.bind("v1", "b1");
        store.bind("v2", "b1");
        store.bind("v2", "b2");

        assert_eq!(store.owners_of("b1"), vec!["v1", "v2"]);
        assert_eq!(store.owners_of("b2"), vec!["v2"]);
        assert!(store.owners_of("b9").is_empty());
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut store = BindingStore::new();
        store.bind("v1", "b1");
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json, serde_json::json!({"v1": ["b1"]}));
    }

    #[test]
    fn test_clear() {
        let mut store = BindingStore::new();
        store.bind("v1", "b1");
        store.bind("v2", "b2");
        assert_eq!(store.len(), 2);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.iter().count(), 0);
    }
}
