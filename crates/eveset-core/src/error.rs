//! Error types for eveset-core

use thiserror::Error;

/// Result type alias using eveset-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for eveset
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format or value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Home directory could not be resolved
    #[error("Could not determine home directory")]
    NoHomeDir,
}

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = Error::invalid_config("max-concurrent must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: max-concurrent must be at least 1"
        );
    }

    #[test]
    fn test_config_not_found_message() {
        let err = Error::config_not_found("/tmp/missing.yaml");
        assert!(err.to_string().contains("/tmp/missing.yaml"));
    }
}
