//! Configuration management for pasteguard.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "pasteguard";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "rules.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (`PASTEGUARD_<SECTION>__<KEY>`)
/// 2. TOML config file at `~/.config/pasteguard/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interception configuration.
    pub guard: GuardConfig,
    /// Custom rule configuration.
    pub rules: RulesConfig,
}

/// Interception-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Intercept pastes. When false every paste passes through.
    pub enabled: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Custom rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Path to the rule database.
    /// Defaults to `~/.local/share/pasteguard/rules.db`
    pub database_path: Option<PathBuf>,
    /// Rules applied in addition to the stored ones.
    pub extra: Vec<String>,
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
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("PASTEGUARD_").split("__"));

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
        if let Some(index) = self.rules.extra.iter().position(|r| r.trim().is_empty()) {
            return Err(Error::ConfigValidation {
                message: format!("rules.extra[{index}] is blank"),
            });
        }

        if self
            .rules
            .database_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            return Err(Error::ConfigValidation {
                message: "rules.database_path cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.rules
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "pasteguard-config-{}-{name}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.guard.enabled);
        assert!(config.rules.database_path.is_none());
        assert!(config.rules.extra.is_empty());
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_blank_extra_rule() {
        let mut config = Config::default();
        config.rules.extra = vec!["falcon".to_string(), "  ".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("rules.extra[1]"));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.rules.database_path = Some(PathBuf::new());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("pasteguard"));
        assert!(path.to_string_lossy().ends_with("rules.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.rules.database_path = Some(PathBuf::from("/custom/path/rules.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/rules.sqlite")
        );
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("pasteguard"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml() {
        let path = write_config(
            "valid",
            r#"
[guard]
enabled = false

[rules]
database_path = "/tmp/custom-rules.db"
extra = ["falcon", "osprey"]
"#,
        );

        let config = Config::load_from(Some(path)).unwrap();
        assert!(!config.guard.enabled);
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/custom-rules.db")
        );
        assert_eq!(config.rules.extra, vec!["falcon", "osprey"]);
    }

    #[test]
    fn test_load_rejects_blank_rule() {
        let path = write_config("blank", "[rules]\nextra = [\"\"]\n");

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_rejects_bad_type() {
        let path = write_config("bad-type", "[guard]\nenabled = \"sometimes\"\n");

        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("enabled"));
        assert!(json.contains("extra"));
    }

    #[test]
    fn test_rules_config_deserialize() {
        let json = r#"{"extra": ["falcon"]}"#;
        let rules: RulesConfig = serde_json::from_str(json).unwrap();
        assert_eq!(rules.extra, vec!["falcon"]);
        assert!(rules.database_path.is_none());
    }
}
