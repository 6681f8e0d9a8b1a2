//! Configuration management for bloodbank.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::{Path, PathBuf};
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
const DATA_DIR_NAME: &str = "bloodbank";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "blood_bank.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "BLOODBANK_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BLOODBANK_`, sections separated by `__`)
/// 2. TOML config file at `~/.config/bloodbank/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Input limits applied to donors and requests.
    pub limits: LimitsConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/bloodbank/blood_bank.db`
    pub database_path: Option<PathBuf>,
    /// How long a writer waits for another session's lock, in milliseconds.
    pub busy_timeout_ms: u64,
}

/// Accepted ranges for donor and request input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Youngest donor accepted.
    pub min_donor_age: u8,
    /// Oldest donor accepted.
    pub max_donor_age: u8,
    /// Most units a donor may register with.
    pub max_donor_units: u32,
    /// Most units a single request may ask for. Unbounded when unset; supply
    /// is the only cap then.
    pub max_request_units: Option<u32>,
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
            min_donor_age: 18,
            max_donor_age: 65,
            max_donor_units: 10,
            max_request_units: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// Sources are merged in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables, e.g. `BLOODBANK_LIMITS__MAX_REQUEST_UNITS=8`
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate one configuration file, which must exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigValidation`] if the file is missing, or the
    /// error from [`Config::load_from`].
    pub fn check_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::ConfigValidation {
                message: format!("{} does not exist", path.display()),
            });
        }
        Self::load_from(Some(path.to_path_buf()))
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
        let limits = &self.limits;
        if limits.min_donor_age > limits.max_donor_age {
            return Err(Error::ConfigValidation {
                message: format!(
                    "min_donor_age ({}) cannot be greater than max_donor_age ({})",
                    limits.min_donor_age, limits.max_donor_age
                ),
            });
        }

        if limits.max_request_units == Some(0) {
            return Err(Error::ConfigValidation {
                message: "max_request_units must be greater than 0".to_string(),
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
        assert_eq!(config.storage.busy_timeout_ms, 5_000);
        assert_eq!(config.limits, LimitsConfig::default());
    }

    #[test]
    fn test_default_limits() {
        let limits = LimitsConfig::default();

        assert_eq!(limits.min_donor_age, 18);
        assert_eq!(limits.max_donor_age, 65);
        assert_eq!(limits.max_donor_units, 10);
        assert_eq!(limits.max_request_units, None);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_inverted_age_range() {
        let mut config = Config::default();
        config.limits.min_donor_age = 70;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("min_donor_age"));
    }

    #[test]
    fn test_validate_zero_request_units() {
        let mut config = Config::default();
        config.limits.max_request_units = Some(0);

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("max_request_units"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("blood_bank.db"));
        assert!(path.to_string_lossy().contains("bloodbank"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/bank.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/bank.sqlite")
        );
    }

    #[test]
    fn test_busy_timeout() {
        let config = Config::default();
        assert_eq!(config.busy_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("bloodbank"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "bloodbank_config_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[limits]\nmax_request_units = 8\n\n[storage]\ndatabase_path = \"/tmp/bank.db\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.limits.max_request_units, Some(8));
        assert_eq!(config.limits.max_donor_units, 10);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/bank.db"));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!(
            "bloodbank_config_invalid_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[limits]\nmin_donor_age = 60\nmax_donor_age = 30\n").unwrap();

        let result = Config::load_from(Some(path.clone()));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_check_file() {
        let path = std::env::temp_dir().join(format!(
            "bloodbank_config_check_{}.toml",
            std::process::id()
        ));
        let missing = Config::check_file(&path);
        assert!(matches!(missing, Err(Error::ConfigValidation { .. })));

        std::fs::write(&path, "[limits]\nmax_donor_units = 4\n").unwrap();
        assert_eq!(Config::check_file(&path).unwrap().limits.max_donor_units, 4);

        std::fs::write(&path, "[limits]\nmax_request_units = 0\n").unwrap();
        assert!(Config::check_file(&path).is_err());

        std::fs::write(&path, "[limits]\nmax_donor_units = \"many\"\n").unwrap();
        assert!(matches!(
            Config::check_file(&path),
            Err(Error::ConfigLoad(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_limits_deserialize_partial() {
        let json = r#"{"max_donor_units": 4}"#;
        let limits: LimitsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(limits.max_donor_units, 4);
        assert_eq!(limits.min_donor_age, 18);
    }

    #[test]
    fn test_config_serialize() {
        let mut config = Config::default();
        config.limits.max_request_units = Some(5);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("busy_timeout_ms"));
        assert!(json.contains("\"max_request_units\":5"));
    }

    #[test]
    fn test_load_storage_section_only() {
        let path = std::env::temp_dir().join(format!(
            "bloodbank_config_storage_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[storage]\nbusy_timeout_ms = 250\n").unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.busy_timeout(), Duration::from_millis(250));
        assert_eq!(config.limits, LimitsConfig::default());

        let _ = std::fs::remove_file(&path);
    }
}
