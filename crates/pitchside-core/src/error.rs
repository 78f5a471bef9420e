//! Core error types for the Pitchside service.
//!
//! This module defines the central error type shared by the foundation types
//! (identifier validation, configuration loading).

use thiserror::Error;

/// Central error type for foundation-level operations.
#[derive(Error, Debug)]
pub enum PitchsideError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors (invalid identifiers, malformed keys)
    #[error("validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found at an explicitly requested path
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `PitchsideError`.
pub type Result<T> = std::result::Result<T, PitchsideError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PitchsideError::Validation("bad match id".to_string());
        assert_eq!(err.to_string(), "validation error: bad match id");

        let err = ConfigError::InvalidValue {
            field: "server.port".to_string(),
            reason: "must be non-zero".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value for server.port: must be non-zero"
        );
    }

    #[test]
    fn test_error_from_config() {
        let config_err = ConfigError::NoConfigDir;
        let err: PitchsideError = config_err.into();
        assert!(matches!(err, PitchsideError::Config(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: PitchsideError = io_err.into();
        assert!(matches!(err, PitchsideError::Io(_)));
    }
}
