//! # Controller Configuration
//!
//! Per-installation policy for settings screens.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TAVOLA_CLEAR_SEARCH_ON_CLOSE=true                                  │
//! │     TAVOLA_EVENT_REPLAY=latest                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tavola/settings.toml (Linux)                             │
//! │     ~/Library/Application Support/com.tavola.tavola/settings.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     keep search text on close, no event replay                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # settings.toml
//! [search]
//! clear_on_close = false
//!
//! [events]
//! replay = "none"     # none | latest
//! capacity = 16
//!
//! [transfer]
//! failure_message = "Unable to complete the operation"
//! export_dir = "/home/asha/exports"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SettingsError, SettingsResult};
use crate::events::{ReplayPolicy, DEFAULT_EVENT_CAPACITY};

// =============================================================================
// Sections
// =============================================================================

/// Search bar behaviour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Clear the query text when the search bar is closed.
    #[serde(default)]
    pub clear_on_close: bool,
}

/// Event channel behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSettings {
    /// Whether a screen that subscribes late sees the last event.
    #[serde(default)]
    pub replay: ReplayPolicy,

    /// Undelivered events kept per subscriber.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for EventSettings {
    fn default() -> Self {
        EventSettings {
            replay: ReplayPolicy::default(),
            capacity: default_capacity(),
        }
    }
}

/// Import/export behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSettings {
    /// Message shown when a failure carries no reason of its own.
    #[serde(default = "default_failure_message")]
    pub failure_message: String,

    /// Directory relative export paths are resolved against.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

fn default_failure_message() -> String {
    "Unable to complete the operation".to_string()
}

impl Default for TransferSettings {
    fn default() -> Self {
        TransferSettings {
            failure_message: default_failure_message(),
            export_dir: None,
        }
    }
}

// =============================================================================
// Controller Configuration
// =============================================================================

/// Complete controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub events: EventSettings,

    #[serde(default)]
    pub transfer: TransferSettings,
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (settings.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SettingsResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading settings config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load settings config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SettingsResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SettingsError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SettingsError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Settings config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SettingsResult<()> {
        if self.events.capacity == 0 {
            return Err(SettingsError::InvalidConfig(
                "events.capacity must be greater than 0".into(),
            ));
        }

        if self.transfer.failure_message.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "transfer.failure_message must not be empty".into(),
            ));
        }

        if let Some(dir) = &self.transfer.export_dir {
            if dir.is_file() {
                return Err(SettingsError::InvalidConfig(format!(
                    "transfer.export_dir is a file: {}",
                    dir.display()
                )));
            }
        }

        Ok(())
    }

    /// Applies `TAVOLA_*` overrides, reading variables through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("TAVOLA_CLEAR_SEARCH_ON_CLOSE") {
            match value.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.search.clear_on_close = true,
                "0" | "false" | "no" => self.search.clear_on_close = false,
                _ => warn!(value = %value, "Unknown clear-on-close flag in environment"),
            }
        }

        if let Some(value) = lookup("TAVOLA_EVENT_REPLAY") {
            match value.parse() {
                Ok(policy) => {
                    debug!(policy = %value, "Overriding event replay from environment");
                    self.events.replay = policy;
                }
                Err(_) => warn!(value = %value, "Unknown event replay policy in environment"),
            }
        }

        if let Some(value) = lookup("TAVOLA_EVENT_CAPACITY") {
            if let Ok(capacity) = value.parse::<usize>() {
                self.events.capacity = capacity;
            }
        }

        if let Some(message) = lookup("TAVOLA_FAILURE_MESSAGE") {
            self.transfer.failure_message = message;
        }

        if let Some(dir) = lookup("TAVOLA_EXPORT_DIR") {
            debug!(dir = %dir, "Overriding export directory from environment");
            self.transfer.export_dir = Some(PathBuf::from(dir));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "tavola", "tavola")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn clear_search_on_close(&self) -> bool {
        self.search.clear_on_close
    }

    pub fn replay_policy(&self) -> ReplayPolicy {
        self.events.replay
    }

    pub fn failure_message(&self) -> &str {
        &self.transfer.failure_message
    }

    /// Resolves an export path against `transfer.export_dir`.
    ///
    /// Absolute paths are returned unchanged.
    pub fn export_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        match &self.transfer.export_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert!(!config.clear_search_on_close());
        assert_eq!(config.replay_policy(), ReplayPolicy::None);
        assert_eq!(config.events.capacity, DEFAULT_EVENT_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: ControllerConfig = toml::from_str(
            r#"
            [events]
            replay = "latest"
            "#,
        )
        .unwrap();

        assert_eq!(config.replay_policy(), ReplayPolicy::Latest);
        assert_eq!(config.events.capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(config.failure_message(), "Unable to complete the operation");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ControllerConfig::default();
        config.apply_overrides(env(&[
            ("TAVOLA_CLEAR_SEARCH_ON_CLOSE", "true"),
            ("TAVOLA_EVENT_REPLAY", "latest"),
            ("TAVOLA_EVENT_CAPACITY", "4"),
            ("TAVOLA_EXPORT_DIR", "/srv/exports"),
        ]));

        assert!(config.clear_search_on_close());
        assert_eq!(config.replay_policy(), ReplayPolicy::Latest);
        assert_eq!(config.events.capacity, 4);
        assert_eq!(config.export_path("charges.json"), PathBuf::from("/srv/exports/charges.json"));
        assert_eq!(config.export_path("/tmp/a.json"), PathBuf::from("/tmp/a.json"));
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = ControllerConfig::default();
        config.apply_overrides(env(&[
            ("TAVOLA_CLEAR_SEARCH_ON_CLOSE", "maybe"),
            ("TAVOLA_EVENT_REPLAY", "sometimes"),
            ("TAVOLA_EVENT_CAPACITY", "lots"),
        ]));

        assert_eq!(config, ControllerConfig::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ControllerConfig::default();
        config.events.capacity = 0;
        assert!(config.validate().is_err());

        config.events.capacity = 8;
        config.transfer.failure_message = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");

        let mut config = ControllerConfig::default();
        config.search.clear_on_close = true;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[search]"));

        let loaded: ControllerConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[events\ncapacity = ").unwrap();

        let config = ControllerConfig::load_or_default(Some(path));
        assert_eq!(config.events.capacity, DEFAULT_EVENT_CAPACITY);
    }
}
