//! Configuration management for Pomodario
//!
//! The config file only holds machine-local concerns (where data and sounds
//! live, whether desktop notifications are wanted). Timer durations and
//! behavior toggles are user settings and live in the data directory.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths::Paths;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "POMODARIO_DATA_DIR";

/// Global Pomodario configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the persisted settings, tasks and stats
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Directory holding `<sound>.wav` alarm files
    #[serde(default)]
    pub sounds_dir: Option<PathBuf>,

    /// Show desktop notifications when a session expires
    #[serde(default = "default_notifications")]
    pub notifications: bool,

    /// Countdown tick period (milliseconds)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_notifications() -> bool {
    true
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            sounds_dir: None,
            notifications: default_notifications(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Load the config from its standard location, falling back to defaults
    /// when the file is unreadable
    pub fn load_or_default(paths: &Paths) -> Self {
        let path = paths.config_file();
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file: {:#}", e);
                Self::default()
            }
        }
    }

    /// Resolve the data directory: env override, then config, then default
    pub fn data_dir(&self, paths: &Paths) -> PathBuf {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        self.data_dir.clone().unwrap_or_else(|| paths.data.clone())
    }

    /// Resolve the alarm sounds directory
    pub fn sounds_dir(&self, paths: &Paths) -> PathBuf {
        self.sounds_dir.clone().unwrap_or_else(|| paths.sounds())
    }

    /// Tick period, never shorter than one millisecond
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
