//! Core error types for the cache engine

use std::path::PathBuf;

/// Result type for cache construction and configuration
pub type Result<T> = std::result::Result<T, CacheError>;

/// Re-export CacheError as Error for convenience
pub use CacheError as Error;

/// Error type for cache construction and configuration loading
#[derive(Debug)]
pub enum CacheError {
    /// Invalid configuration value, rejected at construction time
    Configuration {
        field: &'static str,
        message: String,
        recovery_hint: RecoveryHint,
    },

    /// I/O errors while reading configuration
    Io {
        path: PathBuf,
        operation: &'static str,
        source: std::io::Error,
        recovery_hint: RecoveryHint,
    },

    /// Malformed configuration document
    Serialization {
        origin: String,
        source: Box<dyn std::error::Error + Send + Sync>,
        recovery_hint: RecoveryHint,
    },
}

/// Recovery hints for error handling
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryHint {
    /// Use a default value instead
    UseDefault { value: String },

    /// Check file permissions
    CheckPermissions { path: PathBuf },

    /// Fix the configuration source
    UpdateConfiguration,

    /// No automated recovery possible
    Manual { instructions: String },
}

impl CacheError {
    /// Shorthand for a configuration error on `field`
    pub fn configuration(field: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            field,
            message: message.into(),
            recovery_hint: RecoveryHint::UpdateConfiguration,
        }
    }
}
