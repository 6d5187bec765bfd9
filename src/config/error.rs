//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Platform identifier must be non-zero: {0}")]
    InvalidSnowflake(&'static str),

    #[error("Command prefix must be non-empty and contain no whitespace")]
    InvalidCommandPrefix,

    #[error("Channel prefix must be 1-80 lowercase letters, digits or dashes")]
    InvalidChannelPrefix,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Database pool size must be between 1 and {0}")]
    InvalidPoolSize(u32),

    #[error("Close grace delay must be at most 300 seconds")]
    InvalidGraceDelay,

    #[error("Store timeout must be between 1 and 60000 milliseconds")]
    InvalidStoreTimeout,

    #[error("Invalid log filter directive: {0}")]
    InvalidLogFilter(String),
}
