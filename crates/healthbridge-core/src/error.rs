//! Core error types for healthbridge-core.
//!
//! [`BridgeError`] is the user-facing taxonomy surfaced by gateway and
//! session operations. [`StoreError`] is what a [`HealthStore`] reports,
//! before the gateway classifies it by operation.
//!
//! [`HealthStore`]: crate::gateway::HealthStore

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced to the action that triggered a bridge operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The store denied or failed the permission request.
    #[error("Health store permission not granted: {0}")]
    Authorization(String),

    /// A query failed at the store, or the type is not available there.
    #[error("Data not available: {0}")]
    DataUnavailable(String),

    /// Malformed wire string, unknown type, missing field or bad unit.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The store rejected a write.
    #[error("Failed to save data: {0}")]
    Save(String),
}

impl BridgeError {
    pub fn invalid(message: impl Into<String>) -> Self {
        BridgeError::InvalidData(message.into())
    }
}

/// Errors reported by a health store implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store refused the operation for lack of permission.
    #[error("access denied: {0}")]
    Denied(String),

    /// The store cannot serve the request right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A row held data that does not form a valid sample.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// Background task running the store call panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home or data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Top-level error type for healthbridge-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_error_messages_name_the_failure() {
        assert_eq!(
            BridgeError::invalid("record 2: missing unit").to_string(),
            "Invalid data: record 2: missing unit"
        );
        assert!(BridgeError::Save("disk full".into())
            .to_string()
            .starts_with("Failed to save data"));
    }

    #[test]
    fn core_error_is_transparent_over_bridge_error() {
        let err: CoreError = BridgeError::DataUnavailable("query failed".into()).into();
        assert_eq!(err.to_string(), "Data not available: query failed");
    }
}
