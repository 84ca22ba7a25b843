//! Configuration errors.

use thiserror::Error;

use crate::validator::ValidationResult;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Invalid config format: {0}")]
    InvalidFormat(String),

    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// One entry per failed check, formatted as `path: message`.
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Turn a failed validation into an error. Returns `None` when the result is valid.
    pub fn from_validation(result: &ValidationResult) -> Option<Self> {
        if result.is_valid() {
            return None;
        }
        Some(ConfigError::Invalid(
            result
                .errors
                .iter()
                .map(|e| format!("{}: {}", e.path, e.message))
                .collect(),
        ))
    }
}
