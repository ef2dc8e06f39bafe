//! # Settings Error Types
//!
//! Error types for controller configuration and file transfer.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Settings Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Transfer     │  │     Storage             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  ReadFailed     │  │  Database               │ │
//! │  │  ConfigLoad...  │  │  WriteFailed    │  │                         │ │
//! │  │  ConfigSave...  │  │  Serialization  │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  None of these escape a controller operation: the controller turns    │
//! │  them into a `SettingsEvent::Failed` for the screen.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Settings error type.
#[derive(Debug, Error)]
pub enum SettingsError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid controller configuration.
    #[error("Invalid settings configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transfer Errors
    // =========================================================================
    /// Failed to read an import file.
    #[error("Failed to read {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    /// Failed to write an export file.
    #[error("Failed to write {}: {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },

    /// Entities could not be encoded or decoded.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    // =========================================================================
    // Storage Errors
    // =========================================================================
    /// Repository operation failed.
    #[error("Database error: {0}")]
    Database(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<tavola_db::DbError> for SettingsError {
    fn from(err: tavola_db::DbError) -> Self {
        SettingsError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        SettingsError::SerializationFailed(err.to_string())
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        SettingsError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SettingsError {
    fn from(err: toml::de::Error) -> Self {
        SettingsError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SettingsError {
    fn from(err: toml::ser::Error) -> Self {
        SettingsError::ConfigSaveFailed(err.to_string())
    }
}

impl SettingsError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SettingsError::InvalidConfig(_)
                | SettingsError::ConfigLoadFailed(_)
                | SettingsError::ConfigSaveFailed(_)
        )
    }
}
