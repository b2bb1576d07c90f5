//! JSON file storage adapter for the key-value persistence seam
//!
//! All keys live in one JSON object whose values are the raw strings the
//! store hands over, e.g. `{"darkMode": "true", "todos": "[...]"}`.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use ticklist_core::{CoreError, Persistence, StorageKey};

use crate::error::{CliError, Result};

type Entries = BTreeMap<String, String>;

/// JSON file storage adapter
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new storage adapter for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the storage path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    fn read_entries(&self) -> Result<Entries> {
        if !self.path.exists() {
            return Ok(Entries::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| CliError::io(format!("Failed to read {}", self.path.display()), e))?;
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Read one key
    pub fn get(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(key.as_str()))
    }

    /// Write one key, keeping the others
    ///
    /// A file that reads fine but does not parse is replaced rather than
    /// blocking the write. Read failures are returned, since the other keys
    /// may still be intact on disk.
    pub fn set(&self, key: StorageKey, value: String) -> Result<()> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(e @ CliError::Parse { .. }) => {
                log::warn!("Replacing corrupt store {}: {}", self.path.display(), e);
                Entries::new()
            }
            Err(e) => return Err(e),
        };
        entries.insert(key.as_str().to_string(), value);
        self.write_entries(&entries)
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                CliError::io(format!("Failed to create {}", parent.display()), e)
            })?;
        }

        // Create backup before saving
        self.backup()?;

        let json = serde_json::to_string_pretty(entries)
            .map_err(|e| CliError::storage_with_source("Failed to encode store", e))?;

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }

    /// Copy the current file next to itself as `.json.bak`
    pub fn backup(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(()); // Nothing to backup
        }

        fs::copy(&self.path, self.backup_path())?;
        Ok(())
    }

    /// Check if backup exists
    pub fn backup_exists(&self) -> bool {
        self.backup_path().exists()
    }

    /// Replace the store file with its backup
    pub fn recover(&self) -> Result<()> {
        let backup_path = self.backup_path();

        if !backup_path.exists() {
            return Err(CliError::storage("Backup file not found"));
        }

        // Refuse to restore something we could not load afterwards.
        FileStore::new(&backup_path).read_entries()?;
        fs::copy(&backup_path, &self.path)?;
        Ok(())
    }
}

impl Persistence for FileStore {
    fn load(&self, key: StorageKey) -> ticklist_core::Result<Option<String>> {
        self.get(key)
            .map_err(|e| CoreError::storage_with_source(format!("Failed to load {}", key), e))
    }

    fn store(&self, key: StorageKey, value: String) {
        if let Err(e) = self.set(key, value) {
            log::error!("Failed to save {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileStore {
        FileStore::new(dir.path().join("nested").join("ticklist.json"))
    }

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get(StorageKey::Todos).unwrap(), None);
    }

    #[test]
    fn test_set_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(StorageKey::DarkMode, "true".to_string()).unwrap();
        store.set(StorageKey::Todos, "[]".to_string()).unwrap();

        assert_eq!(store.get(StorageKey::DarkMode).unwrap().as_deref(), Some("true"));
        assert_eq!(store.get(StorageKey::Todos).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_corrupt_file_is_an_error_on_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ticklist.json");
        fs::write(&path, "{{{{").unwrap();

        let store = FileStore::new(&path);
        assert!(store.get(StorageKey::Todos).is_err());
        assert!(Persistence::load(&store, StorageKey::Todos).is_err());
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ticklist.json");
        fs::write(&path, "garbage").unwrap();

        let store = FileStore::new(&path);
        store.set(StorageKey::DarkMode, "false".to_string()).unwrap();

        assert_eq!(store.get(StorageKey::DarkMode).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn test_read_failure_does_not_wipe_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ticklist.json");
        let original = [0xff, 0xfe, b'{'];
        fs::write(&path, original).unwrap();

        let store = FileStore::new(&path);
        let result = store.set(StorageKey::DarkMode, "true".to_string());

        assert!(matches!(result, Err(CliError::Io { .. })));
        assert_eq!(fs::read(&path).unwrap(), original.to_vec());
    }

    #[test]
    fn test_backup_and_recover() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set(StorageKey::Todos, "[1]".to_string()).unwrap();
        assert!(!store.backup_exists());

        store.set(StorageKey::Todos, "[2]".to_string()).unwrap();
        assert!(store.backup_exists());

        store.recover().unwrap();
        assert_eq!(store.get(StorageKey::Todos).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_recover_without_backup() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.recover().is_err());
    }
}
