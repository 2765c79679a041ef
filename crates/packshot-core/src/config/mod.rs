//! Configuration management for Packshot.
//!
//! Configuration is loaded from the platform config directory with defaults
//! that reproduce the upload contract (5 MiB caps, 1920 px, quality 85).

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Packshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resource limits
    pub limits: LimitsConfig,

    /// Output encoding settings
    pub encode: EncodeConfig,

    /// Image store settings
    pub storage: StorageConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.packshot.packshot/config.toml
    /// - Linux: ~/.config/packshot/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\packshot\config\config.toml
    ///
    /// Falls back to ~/.packshot/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "packshot", "packshot")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".packshot").join("config.toml")
            })
    }

    /// Get the resolved storage directory (with ~ expansion).
    pub fn storage_dir(&self) -> PathBuf {
        let path_str = self.storage.dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_contract() {
        let config = Config::default();
        assert_eq!(config.limits.max_upload_bytes, 5 * 1024 * 1024);
        assert_eq!(config.limits.max_processed_bytes, 5 * 1024 * 1024);
        assert_eq!(config.limits.max_dimension, 1920);
        assert_eq!(config.encode.quality, 85);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[limits]"));
        assert!(toml.contains("[encode]"));
        assert!(toml.contains("[storage]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[encode]\nquality = 70\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.encode.quality, 70);
        assert_eq!(config.limits.max_dimension, MAX_DIMENSION);
    }

    #[test]
    fn test_load_from_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmax_dimension = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_storage_dir_expands_tilde() {
        let config = Config::default();
        let dir = config.storage_dir();
        assert!(!dir.to_string_lossy().starts_with('~'));
        assert!(dir.ends_with(".packshot/images"));
    }
}
