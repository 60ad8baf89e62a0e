//! Configuration management for preppy.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "preppy";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "preppy.db";

/// Default catalog directory name, under the data directory.
const CATALOG_DIR_NAME: &str = "catalog";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PREPPY_`)
/// 2. TOML config file at `~/.config/preppy/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Catalog configuration.
    pub catalog: CatalogConfig,
    /// Input limits.
    pub limits: LimitsConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/preppy/preppy.db`
    pub database_path: Option<PathBuf>,
    /// How long a writer waits on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
}

/// Catalog-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Directory holding the catalog CSV files.
    /// Defaults to `~/.local/share/preppy/catalog`
    pub data_dir: Option<PathBuf>,
}

/// Limits applied when validating user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Longest accepted name (household, custom item, contact), in characters.
    pub max_name_length: usize,
    /// Longest accepted free-text note (medications, event description), in characters.
    pub max_note_length: usize,
    /// Largest accepted count for any one household category.
    pub max_household_count: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            busy_timeout_ms: 5_000,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_name_length: 200,
            max_note_length: 2_000,
            max_household_count: 99,
        }
    }
}

impl LimitsConfig {
    /// One violation per named field longer than `max_name_length`.
    #[must_use]
    pub fn name_violations(&self, fields: &[(&str, &str)]) -> Vec<String> {
        too_long(fields, self.max_name_length)
    }

    /// One violation per note field longer than `max_note_length`.
    #[must_use]
    pub fn note_violations(&self, fields: &[(&str, &str)]) -> Vec<String> {
        too_long(fields, self.max_note_length)
    }
}

fn too_long(fields: &[(&str, &str)], max: usize) -> Vec<String> {
    fields
        .iter()
        .filter(|(_, value)| value.chars().count() > max)
        .map(|(label, _)| format!("{label} must be at most {max} characters."))
        .collect()
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `PREPPY_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PREPPY_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_name_length == 0 {
            return Err(Error::ConfigValidation {
                message: "max_name_length must be greater than 0".to_string(),
            });
        }

        if self.limits.max_note_length == 0 {
            return Err(Error::ConfigValidation {
                message: "max_note_length must be greater than 0".to_string(),
            });
        }

        if self.limits.max_household_count == 0 {
            return Err(Error::ConfigValidation {
                message: "max_household_count must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the catalog directory, resolving defaults if not set.
    #[must_use]
    pub fn catalog_dir(&self) -> PathBuf {
        self.catalog
            .data_dir
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(CATALOG_DIR_NAME))
    }

    /// Get the busy timeout as a Duration.
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.storage.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.catalog.data_dir.is_none());
        assert_eq!(config.limits.max_name_length, 200);
        assert_eq!(config.limits.max_household_count, 99);
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_name_length() {
        let mut config = Config::default();
        config.limits.max_name_length = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_name_length"));
    }

    #[test]
    fn test_validate_zero_note_length() {
        let mut config = Config::default();
        config.limits.max_note_length = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_note_length"));
    }

    #[test]
    fn test_length_violations() {
        let limits = LimitsConfig {
            max_name_length: 3,
            max_note_length: 5,
            ..LimitsConfig::default()
        };
        assert_eq!(
            limits.name_violations(&[("Name", "Anabel"), ("Phone", "555")]),
            vec!["Name must be at most 3 characters.".to_string()]
        );
        assert!(limits.note_violations(&[("Notes", "héllo")]).is_empty());
    }

    #[test]
    fn test_validate_zero_household_count() {
        let mut config = Config::default();
        config.limits.max_household_count = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_household_count"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("preppy.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_catalog_dir_default() {
        let config = Config::default();
        assert!(config.catalog_dir().ends_with("preppy/catalog"));
    }

    #[test]
    fn test_busy_timeout() {
        let config = Config::default();
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("preppy"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        // Loading from a nonexistent path should work (uses defaults)
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[storage]\ndatabase_path = \"/tmp/household.db\"\n\n[limits]\nmax_household_count = 12\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/household.db"));
        assert_eq!(config.limits.max_household_count, 12);
        assert_eq!(config.limits.max_name_length, 200);
    }

    #[test]
    fn test_load_invalid_toml_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[limits]\nmax_name_length = 0\n").unwrap();

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_limits_config_deserialize() {
        let json = r#"{"max_name_length": 50}"#;
        let limits: LimitsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(limits.max_name_length, 50);
        assert_eq!(limits.max_note_length, 2_000);
        assert_eq!(limits.max_household_count, 99);
    }
}
