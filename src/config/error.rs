//! Configuration error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid policy file {path}: {source}")]
    InvalidPolicy {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("repository owner and name must be non-empty")]
    InvalidRepo,

    #[error("mood set must not be empty")]
    EmptyMoodSet,

    #[error("override window must be at least 2")]
    OverrideWindowTooSmall,

    #[error("post maximum length must be positive")]
    InvalidPostLength,

    #[error("weight clamp bounds are inverted")]
    InvalidWeightClamp,

    #[error("frequency penalty exponent must be at least 1.5")]
    FrequencyExponentTooSmall,

    #[error("action log maximum must be positive")]
    InvalidLogMax,
}
