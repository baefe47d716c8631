//! Core error types for countdown-core.
//!
//! The timer and alarm state machines never fail: invalid commands are
//! no-ops. Errors only exist at the storage edges (settings file, config
//! file), and are defined here with thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for countdown-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine or create the data directory
    #[error("Failed to prepare data directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Errors raised by a [`SettingsStore`](crate::storage::SettingsStore) backend.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Failed to write the settings file
    #[error("Failed to write settings to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode the settings document
    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type alias for countdown-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidValue {
            key: "timer.tick_interval_ms".to_string(),
            message: "must be greater than zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for 'timer.tick_interval_ms': must be greater than zero"
        );
    }

    #[test]
    fn config_error_wraps_into_core_error() {
        let err = ConfigError::LoadFailed {
            path: PathBuf::from("/tmp/config.toml"),
            message: "expected `=`".to_string(),
        };
        let core: CoreError = err.into();
        assert!(core
            .to_string()
            .starts_with("Configuration error: Failed to load configuration"));
    }
}
