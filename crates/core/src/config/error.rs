use thiserror::Error;

/// Errors found while validating warehouse configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting {section}.{key}")]
    MissingSetting {
        section: &'static str,
        key: &'static str,
    },
    #[error("Invalid value for {section}.{key} ({value:?}): {reason}")]
    InvalidValue {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Result type for configuration validation.
pub type Result<T> = std::result::Result<T, ConfigError>;
