//! Keyed store trait definition.
//!
//! The `KeyedStore` trait is the seam between Folio's domain logic and the
//! persistence substrate. Backends only need plain get/set/remove/enumerate;
//! batch atomicity comes from [`KeyedStore::apply`], which backends with
//! native transactions override.

use tracing::warn;

use crate::error::{FolioError, Result};

/// A single write in a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Write `value` under `key`, replacing any previous value.
    Set { key: String, value: String },
    /// Remove `key` if present.
    Remove { key: String },
}

impl StoreOp {
    pub fn set(key: impl Into<String>, value: impl Into<String>) -> Self {
        StoreOp::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn remove(key: impl Into<String>) -> Self {
        StoreOp::Remove { key: key.into() }
    }

    /// The key this operation touches.
    pub fn key(&self) -> &str {
        match self {
            StoreOp::Set { key, .. } | StoreOp::Remove { key } => key,
        }
    }
}

/// Persistent string key-value store.
///
/// Implementations must ensure:
/// - `set` replaces the full value (no merge writes)
/// - `remove` of a missing key is not an error
/// - `keys` enumerates every key currently stored
pub trait KeyedStore {
    /// Read a value.
    ///
    /// Returns `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Storage` when the backend rejects the write
    /// (quota, unavailable, I/O).
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove a key.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Enumerate all keys.
    fn keys(&self) -> Result<Vec<String>>;

    /// Enumerate keys starting with `prefix`, in sorted order.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }

    /// Apply a batch all-or-nothing.
    ///
    /// The default implementation records the previous value of each key
    /// before touching it and rolls the applied prefix back when any step
    /// fails. The rollback goes through the same `set`/`remove` calls, so a
    /// backend that keeps failing (a full quota, say) can leave part of the
    /// batch applied. That case is reported as a `FolioError::Storage`
    /// naming the keys left modified. Backends with native transactions
    /// should override this method.
    fn apply(&mut self, ops: &[StoreOp]) -> Result<()> {
        let mut undo: Vec<(String, Option<String>)> = Vec::with_capacity(ops.len());
        for op in ops {
            let step = self.get(op.key()).and_then(|previous| {
                match op {
                    StoreOp::Set { key, value } => self.set(key, value)?,
                    StoreOp::Remove { key } => self.remove(key)?,
                }
                Ok(previous)
            });
            match step {
                Ok(previous) => undo.push((op.key().to_string(), previous)),
                Err(err) => {
                    let stuck = rollback(self, undo);
                    if stuck.is_empty() {
                        return Err(err);
                    }
                    let cause = match err {
                        FolioError::Storage(message) => message,
                        other => other.to_string(),
                    };
                    return Err(FolioError::Storage(format!(
                        "{} (rollback incomplete, left modified: {})",
                        cause,
                        stuck.join(", ")
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Undo applied steps, newest first. Returns the keys that could not be
/// restored.
fn rollback<S: KeyedStore + ?Sized>(
    store: &mut S,
    undo: Vec<(String, Option<String>)>,
) -> Vec<String> {
    let mut stuck = Vec::new();
    for (key, previous) in undo.into_iter().rev() {
        let restored = match previous {
            Some(value) => store.set(&key, &value),
            None => store.remove(&key),
        };
        if let Err(err) = restored {
            warn!(key = %key, error = %err, "rollback step failed");
            stuck.push(key);
        }
    }
    stuck
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_dyn(_store: &mut dyn KeyedStore) {}
    }

    /// Allows `budget` writes, then rejects every `set`.
    struct QuotaStore {
        values: BTreeMap<String, String>,
        budget: usize,
    }

    impl KeyedStore for QuotaStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.budget == 0 {
                return Err(FolioError::Storage("quota exceeded".to_string()));
            }
            self.budget -= 1;
            self.values.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.values.remove(key);
            Ok(())
        }

        fn keys(&self) -> Result<Vec<String>> {
            Ok(self.values.keys().cloned().collect())
        }
    }

    #[test]
    fn test_apply_rolls_back_new_keys() {
        let mut store = QuotaStore {
            values: BTreeMap::new(),
            budget: 1,
        };
        let err = store
            .apply(&[StoreOp::set("a", "1"), StoreOp::set("b", "2")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Storage error: quota exceeded");
        assert!(store.values.is_empty());
    }

    #[test]
    fn test_apply_reports_incomplete_rollback() {
        let mut store = QuotaStore {
            values: BTreeMap::from([("a".to_string(), "old".to_string())]),
            budget: 1,
        };
        let err = store
            .apply(&[StoreOp::set("a", "new"), StoreOp::set("b", "2")])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Storage error: quota exceeded (rollback incomplete, left modified: a)"
        );
        assert_eq!(store.values.get("a").map(String::as_str), Some("new"));
    }

    #[test]
    fn test_store_op_key() {
        assert_eq!(StoreOp::set("a", "1").key(), "a");
        assert_eq!(StoreOp::remove("b").key(), "b");
    }
}
