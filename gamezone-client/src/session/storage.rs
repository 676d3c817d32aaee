//! Durable key-value storage for the session.
//!
//! The identity and credential live under [`AUTH_TOKEN_KEY`] and
//! [`AUTH_USER_KEY`]. Writes of both go through [`SessionStorage::write_all`]
//! so they land together or not at all.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const AUTH_USER_KEY: &str = "auth_user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Session storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Session storage unavailable: {0}")]
    Unavailable(String),
}

/// Synchronous key-value storage. Implementations must apply each
/// `write_all` and `remove_all` atomically.
pub trait SessionStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError>;

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError>;
}

// ============================================================================
// FILE STORAGE
// ============================================================================

/// JSON object on disk, replaced wholesale through a temp file and rename.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn persist(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut temp = tempfile::NamedTempFile::new_in(&dir)?;
        let contents = serde_json::to_vec_pretty(map)?;
        temp.write_all(&contents)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|err| StorageError::Io(err.error))?;
        Ok(())
    }

    fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.guard();
        Ok(self.load()?.remove(key))
    }

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let _guard = self.guard();
        let mut map = self.load().unwrap_or_default();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.persist(&map)
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let _guard = self.guard();
        // A corrupt file is dropped entirely rather than left behind.
        let mut map = self.load().unwrap_or_default();
        for key in keys {
            map.remove(*key);
        }
        self.persist(&map)
    }
}

// ============================================================================
// MEMORY STORAGE
// ============================================================================

/// In-process storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn write_all(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut map = self.entries();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_all(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut map = self.entries();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested").join("session.json"));

        assert_eq!(storage.read(AUTH_TOKEN_KEY).unwrap(), None);
        storage
            .write_all(&[(AUTH_TOKEN_KEY, "tok"), (AUTH_USER_KEY, "{}")])
            .unwrap();
        assert_eq!(storage.read(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tok"));

        let reopened = FileStorage::new(storage.path());
        assert_eq!(reopened.read(AUTH_USER_KEY).unwrap().as_deref(), Some("{}"));

        reopened.remove_all(&[AUTH_TOKEN_KEY, AUTH_USER_KEY]).unwrap();
        assert_eq!(storage.read(AUTH_TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.read(AUTH_USER_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_storage_corrupt_file_reported_then_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        let storage = FileStorage::new(&path);

        assert!(matches!(storage.read(AUTH_TOKEN_KEY), Err(StorageError::Corrupt(_))));
        storage.remove_all(&[AUTH_TOKEN_KEY]).unwrap();
        assert_eq!(storage.read(AUTH_TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_memory_storage() {
        let storage = MemoryStorage::with_entries([(AUTH_TOKEN_KEY, "a")]);
        assert_eq!(storage.read(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("a"));
        storage.remove_all(&[AUTH_TOKEN_KEY]).unwrap();
        assert!(storage.is_empty());
    }
}
