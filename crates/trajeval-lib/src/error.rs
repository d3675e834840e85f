use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a trajectory log into action strings
#[derive(Debug, Error)]
pub enum ParseError {
    /// The trajectory file does not exist
    #[error("Trajectory file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The log is valid JSON but not a list of records
    #[error("Invalid trajectory format: {0}")]
    InvalidFormat(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ParseError {
    /// Create a new invalid format error
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

/// Errors raised while loading a golden path registry
#[derive(Debug, Error)]
pub enum GoldenPathError {
    /// A task was registered with no steps
    #[error("Golden path for task '{0}' is empty")]
    EmptyPath(String),

    /// I/O error
    #[error("I/O error reading golden paths from {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Errors raised while loading or validating scoring configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value is out of its allowed range
    #[error("Invalid configuration: {0}")]
    InvalidValue(String),

    /// I/O error
    #[error("I/O error reading config from {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Create a new invalid value error
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidValue(msg.into())
    }
}

/// Result type for trajectory parsing
pub type ParseResult<T> = Result<T, ParseError>;
