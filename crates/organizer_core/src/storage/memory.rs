//! In-process key-value store.

use super::{KeyValueStore, StorageError, StorageResult};
use std::collections::BTreeMap;

/// Map-backed store for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: BTreeMap<String, Vec<u8>>,
    read_only: bool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail with `StorageError::Unavailable`.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_writable(&self) -> StorageResult<()> {
        if self.read_only {
            return Err(StorageError::Unavailable("store is read-only".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.ensure_writable()?;
        self.entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.ensure_writable()?;
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryKeyValueStore;
    use crate::storage::{KeyValueStore, StorageError};

    #[test]
    fn set_replaces_previous_value() {
        let mut store = MemoryKeyValueStore::new();
        store.set("k", b"one").unwrap();
        store.set("k", b"two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"two"[..]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn read_only_rejects_writes_and_keeps_data() {
        let mut store = MemoryKeyValueStore::new();
        store.set("k", b"kept").unwrap();
        store.set_read_only(true);

        let err = store.set("k", b"lost").unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"kept"[..]));
    }
}
