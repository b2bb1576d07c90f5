//! Key-value persistence seam
//!
//! The store reads its state once at startup and writes after every
//! mutation. Writes are fire-and-forget: implementations deal with their
//! own failures and never report back to the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{CoreError, Result};

/// Keys the store persists under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// JSON array of task records
    Todos,
    /// JSON boolean
    DarkMode,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKey::Todos => "todos",
            StorageKey::DarkMode => "darkMode",
        }
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable local key-value storage used by [`crate::TaskListStore`]
pub trait Persistence {
    /// Read the value stored under `key`, `Ok(None)` if absent
    fn load(&self, key: StorageKey) -> Result<Option<String>>;

    /// Write `value` under `key` without waiting for the outcome
    fn store(&self, key: StorageKey, value: String);
}

/// Shared in-memory store
///
/// Clones share the same map, so a test can hand one clone to a store and
/// inspect or reload through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<StorageKey, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing serialization
    pub fn with_entry(self, key: StorageKey, value: impl Into<String>) -> Self {
        self.store(key, value.into());
        self
    }

    /// Current raw value under `key`
    pub fn get(&self, key: StorageKey) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&key).cloned())
    }
}

impl Persistence for MemoryStore {
    fn load(&self, key: StorageKey) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CoreError::storage("Memory store lock poisoned"))?;
        Ok(entries.get(&key).cloned())
    }

    fn store(&self, key: StorageKey, value: String) {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key, value);
            }
            Err(_) => log::error!("Memory store lock poisoned, dropping write to {}", key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();

        store.store(StorageKey::DarkMode, "true".to_string());

        assert_eq!(other.load(StorageKey::DarkMode).unwrap().as_deref(), Some("true"));
        assert_eq!(other.load(StorageKey::Todos).unwrap(), None);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(StorageKey::Todos.as_str(), "todos");
        assert_eq!(StorageKey::DarkMode.to_string(), "darkMode");
    }
}
