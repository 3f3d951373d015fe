use std::io;
use thiserror::Error;

/// Custom error type for configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read configuration: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The file parsed but holds values the tracker cannot run with
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Type alias for Result with ConfigError
pub type Result<T> = std::result::Result<T, ConfigError>;
