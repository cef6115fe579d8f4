// File: ./src/config.rs
// Handles configuration loading, saving, and defaults.
use crate::context::AppContext;
use crate::preferences::DEFAULT_PREFERENCES;
use crate::storage::LocalStorage;
use anyhow::{Error, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;

fn default_preferences_name() -> String {
    DEFAULT_PREFERENCES.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Namespace used by the shared `Preferences` instance.
    #[serde(default = "default_preferences_name")]
    pub preferences_name: String,
    /// Debug build behaviour, currently just the mock clock.
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preferences_name: default_preferences_name(),
            debug: false,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load the configuration from disk using an explicit context.
    /// Returns a contextualized error if reading or parsing fails.
    pub fn load(ctx: &dyn AppContext) -> Result<Self> {
        let path = ctx.get_config_file_path()?;

        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found"));
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;

        Ok(config)
    }

    /// Load the configuration, falling back to defaults when the file is
    /// missing. Other failures are logged and also yield defaults.
    pub fn load_or_default(ctx: &dyn AppContext) -> Self {
        match Self::load(ctx) {
            Ok(config) => config,
            Err(e) if Self::is_missing_config_error(&e) => Self::default(),
            Err(e) => {
                log::warn!("Ignoring unreadable config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    /// Helper to detect whether an anyhow::Error indicates that the config file was missing.
    pub fn is_missing_config_error(err: &Error) -> bool {
        if err.to_string().contains("Config file not found") {
            return true;
        }

        for cause in err.chain() {
            if let Some(io_err) = cause.downcast_ref::<std::io::Error>()
                && io_err.kind() == std::io::ErrorKind::NotFound
            {
                return true;
            }
        }

        false
    }

    /// Save configuration using an explicit context.
    pub fn save(&self, ctx: &dyn AppContext) -> Result<()> {
        let path = ctx.get_config_file_path()?;
        LocalStorage::with_lock(&path, || {
            let toml_str = toml::to_string_pretty(self)?;
            LocalStorage::atomic_write(&path, toml_str)?;
            Ok(())
        })?;
        Ok(())
    }

    /// Parsed `log_level`; unknown values fall back to `Info`.
    pub fn log_level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(self.log_level.trim()).unwrap_or(LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_missing_config_detected() {
        let ctx = TestContext::new();
        let err = Config::load(&ctx).unwrap_err();
        assert!(Config::is_missing_config_error(&err));
        assert_eq!(Config::load_or_default(&ctx), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let ctx = TestContext::new();
        let config = Config {
            preferences_name: "settings".to_string(),
            debug: true,
            log_level: "debug".to_string(),
        };
        config.save(&ctx).unwrap();

        let loaded = Config::load(&ctx).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.log_level_filter(), LevelFilter::Debug);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        fs::write(&path, "debug = true\n").unwrap();

        let loaded = Config::load(&ctx).unwrap();
        assert!(loaded.debug);
        assert_eq!(loaded.preferences_name, "main");
        assert_eq!(loaded.log_level_filter(), LevelFilter::Info);
    }

    #[test]
    fn test_broken_file_is_not_missing() {
        let ctx = TestContext::new();
        let path = ctx.get_config_file_path().unwrap();
        fs::write(&path, "debug = [").unwrap();

        let err = Config::load(&ctx).unwrap_err();
        assert!(!Config::is_missing_config_error(&err));
        assert_eq!(Config::load_or_default(&ctx), Config::default());
    }

    #[test]
    fn test_unknown_log_level_falls_back() {
        let config = Config {
            log_level: "chatty".to_string(),
            ..Config::default()
        };
        assert_eq!(config.log_level_filter(), LevelFilter::Info);
    }
}
