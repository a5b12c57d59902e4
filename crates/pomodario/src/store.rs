//! Typed persistence for settings, tasks and statistics
//!
//! Each structure is one JSON blob in the [`Storage`] port:
//! - `pomoDarioSettings`: [`SessionConfig`]
//! - `pomoDarioTasks`: [`TaskList`]
//! - `pomoDarioStats`: [`StatsRecord`]
//!
//! Missing or malformed blobs load as defaults.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::settings::SessionConfig;
use crate::stats::StatsRecord;
use crate::storage::{Storage, StorageError};
use crate::tasks::TaskList;

pub const SETTINGS_KEY: &str = "pomoDarioSettings";
pub const TASKS_KEY: &str = "pomoDarioTasks";
pub const STATS_KEY: &str = "pomoDarioStats";

/// Pomodario data store
pub struct PomoStore {
    storage: Box<dyn Storage>,
}

impl PomoStore {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Load settings, coerced into range
    pub fn load_settings(&self) -> SessionConfig {
        self.load_or_default::<SessionConfig>(SETTINGS_KEY).normalized()
    }

    pub fn save_settings(&self, config: &SessionConfig) -> Result<(), StorageError> {
        self.save_json(SETTINGS_KEY, config)
    }

    pub fn load_tasks(&self) -> TaskList {
        self.load_or_default(TASKS_KEY)
    }

    pub fn save_tasks(&self, tasks: &TaskList) -> Result<(), StorageError> {
        self.save_json(TASKS_KEY, tasks)
    }

    pub fn load_stats(&self) -> StatsRecord {
        self.load_or_default(STATS_KEY)
    }

    pub fn save_stats(&self, stats: &StatsRecord) -> Result<(), StorageError> {
        self.save_json(STATS_KEY, stats)
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let blob = match self.storage.load(key) {
            Ok(Some(blob)) => blob,
            Ok(None) => return T::default(),
            Err(e) => {
                tracing::warn!("Using defaults for {}: {}", key, e);
                return T::default();
            }
        };

        if blob.trim().is_empty() {
            return T::default();
        }

        match serde_json::from_str(&blob) {
            Ok(value) => value,
            Err(e) => {
                // Log but don't fail on malformed blobs
                tracing::warn!("Discarding malformed {}: {}", key, e);
                T::default()
            }
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let blob = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.storage.save(key, &blob)?;
        tracing::debug!(key, bytes = blob.len(), "saved blob");
        Ok(())
    }
}
