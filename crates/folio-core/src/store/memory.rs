//! In-memory keyed store.

use std::collections::BTreeMap;

use super::traits::KeyedStore;
use crate::error::Result;

/// Volatile store backed by a sorted map.
///
/// Used for tests and scratch sessions; nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyedStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreOp;

    #[test]
    fn test_set_get_remove() {
        let mut store = MemoryStore::new();
        store.set("project_a_b", "{}").unwrap();
        assert_eq!(store.get("project_a_b").unwrap().as_deref(), Some("{}"));
        store.remove("project_a_b").unwrap();
        assert!(store.get("project_a_b").unwrap().is_none());
        // Removing a missing key is fine
        store.remove("project_a_b").unwrap();
    }

    #[test]
    fn test_prefix_scan_is_exact() {
        let mut store = MemoryStore::new();
        store.set("project_dnd_a", "1").unwrap();
        store.set("project_dnd_b", "2").unwrap();
        store.set("project_dndx_c", "3").unwrap();
        store.set("zzz", "4").unwrap();
        assert_eq!(
            store.keys_with_prefix("project_dnd_").unwrap(),
            vec!["project_dnd_a".to_string(), "project_dnd_b".to_string()]
        );
    }

    #[test]
    fn test_apply_batch() {
        let mut store = MemoryStore::new();
        store.set("gone", "x").unwrap();
        store
            .apply(&[StoreOp::set("a", "1"), StoreOp::remove("gone")])
            .unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        assert!(store.get("gone").unwrap().is_none());
    }
}
