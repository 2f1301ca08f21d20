//! Session storage for connection settings
//!
//! Storage is a key-value collaborator behind a trait so the store never
//! touches the filesystem directly. The file implementation keeps one JSON
//! file per key under a session directory; the memory implementation backs
//! tests and embedded use.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{ClientError, Result};

/// Storage key holding the JSON-serialized connection settings
pub const SETTINGS_KEY: &str = "clientOpts";

/// Key-value storage for session state
pub trait SettingsStorage: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed session storage, one JSON file per key
pub struct FileSettingsStorage {
    base_path: PathBuf,
}

impl FileSettingsStorage {
    /// Create storage rooted at the default session directory
    pub fn new() -> Self {
        Self {
            base_path: Self::session_path(),
        }
    }

    /// Create storage rooted at an explicit directory
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Session directory from environment or default
    fn session_path() -> PathBuf {
        if let Ok(path) = std::env::var("CLUSTERLENS_SESSION_PATH") {
            return PathBuf::from(path);
        }

        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".clusterlens").join("session");
        }

        PathBuf::from(".clusterlens").join("session")
    }

    fn file_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.base_path.join(format!("{name}.json"))
    }
}

impl Default for FileSettingsStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStorage for FileSettingsStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let file = self.file_for(key);
        if !file.exists() {
            return Ok(None);
        }

        read_file(&file).map(Some)
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let file = self.file_for(key);
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).map_err(|e| ClientError::Storage(e.to_string()))?;
        }

        fs::write(&file, value).map_err(|e| ClientError::Storage(e.to_string()))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let file = self.file_for(key);
        if file.exists() {
            fs::remove_file(&file).map_err(|e| ClientError::Storage(e.to_string()))?;
        }

        Ok(())
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ClientError::Storage(e.to_string()))
}

/// In-memory session storage
#[derive(Default)]
pub struct MemorySettingsStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySettingsStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStorage for MemorySettingsStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_round_trip() {
        let storage = MemorySettingsStorage::new();
        assert_eq!(storage.get(SETTINGS_KEY).unwrap(), None);

        storage.put(SETTINGS_KEY, "{\"host\":\"http://x\"}").unwrap();
        assert_eq!(
            storage.get(SETTINGS_KEY).unwrap().as_deref(),
            Some("{\"host\":\"http://x\"}")
        );

        storage.remove(SETTINGS_KEY).unwrap();
        assert_eq!(storage.get(SETTINGS_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSettingsStorage::with_base_path(dir.path());

        assert_eq!(storage.get(SETTINGS_KEY).unwrap(), None);

        storage.put(SETTINGS_KEY, "{\"host\":\"http://x\"}").unwrap();
        assert_eq!(
            storage.get(SETTINGS_KEY).unwrap().as_deref(),
            Some("{\"host\":\"http://x\"}")
        );

        storage.remove(SETTINGS_KEY).unwrap();
        assert_eq!(storage.get(SETTINGS_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileSettingsStorage::with_base_path(&nested);

        storage.put(SETTINGS_KEY, "{}").unwrap();
        assert!(nested.join("clientOpts.json").exists());
    }

    #[test]
    fn test_file_storage_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSettingsStorage::with_base_path(dir.path());

        storage.put("../escape", "{}").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }
}
