//! Key-value persistence port
//!
//! Every persisted structure is one textual blob under one key. Writes
//! replace the whole blob; there are no partial updates.
//! - `FileStorage`: one `<key>.json` file per key in a data directory
//! - `MemoryStorage`: shared in-process map

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Failed to read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A blob store keyed by name
pub trait Storage: Send {
    /// Load the blob stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the blob stored under `key`
    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError>;
}

/// Directory-backed storage
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    /// Create a file storage rooted at `data_dir`, creating it if needed
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| StorageError::Read {
                key: key.to_string(),
                source,
            })
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        let write_err = |source| StorageError::Write {
            key: key.to_string(),
            source,
        };

        fs::write(&tmp, blob).map_err(write_err)?;
        fs::rename(&tmp, &path).map_err(write_err)
    }
}

/// In-memory storage; clones share the same map
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, blob: &str) -> Result<(), StorageError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(PoisonError::into_inner);
        blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_storage(test_name: &str) -> (FileStorage, PathBuf) {
        let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = env::temp_dir().join(format!(
            "pomodario_storage_test_{}_{}_{}",
            std::process::id(),
            test_name,
            counter
        ));
        let _ = fs::remove_dir_all(&temp_dir);
        let storage = FileStorage::new(&temp_dir).unwrap();
        (storage, temp_dir)
    }

    #[test]
    fn test_missing_key_loads_none() {
        let (storage, temp_dir) = temp_storage("missing");
        assert!(storage.load("pomoDarioTasks").unwrap().is_none());
        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_save_replaces_blob() {
        let (storage, temp_dir) = temp_storage("replace");

        storage.save("pomoDarioStats", r#"{"a":1}"#).unwrap();
        storage.save("pomoDarioStats", r#"{"b":2}"#).unwrap();

        assert_eq!(
            storage.load("pomoDarioStats").unwrap().as_deref(),
            Some(r#"{"b":2}"#)
        );
        assert!(temp_dir.join("pomoDarioStats.json").exists());
        assert!(!temp_dir.join("pomoDarioStats.json.tmp").exists());

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let (storage, temp_dir) = temp_storage("keys");

        assert!(matches!(
            storage.save("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(storage.load(""), Err(StorageError::InvalidKey(_))));

        let _ = fs::remove_dir_all(&temp_dir);
    }

    #[test]
    fn test_memory_storage_clones_share_state() {
        let storage = MemoryStorage::new();
        let view = storage.clone();
        assert!(view.is_empty());

        storage.save("darkMode", "true").unwrap();
        assert_eq!(view.load("darkMode").unwrap().as_deref(), Some("true"));
        assert_eq!(view.len(), 1);
    }
}
