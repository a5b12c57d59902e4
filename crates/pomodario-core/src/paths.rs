//! Standard paths used by Pomodario

use std::path::PathBuf;

/// Standard Pomodario paths
pub struct Paths {
    /// Data directory (~/.local/share/pomodario)
    pub data: PathBuf,
    /// Config directory (~/.config/pomodario)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("pomodario");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("pomodario");

        Self { data, config }
    }

    /// Path of the application config file
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.json")
    }

    /// Default directory holding alarm sound files
    pub fn sounds(&self) -> PathBuf {
        self.data.join("sounds")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_namespaced() {
        let paths = Paths::new();
        assert!(paths.data.ends_with("pomodario"));
        assert!(paths.config_file().ends_with("pomodario/config.json"));
        assert!(paths.sounds().starts_with(&paths.data));
    }
}
