//! Error types for the runner.

use parcel_geo::GeoError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop the session or prevent it from starting.
///
/// User-facing rejections (budget, export, fetch) are not errors at this
/// level; the session turns them into [`Notice`](crate::Notice)s.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration parsed but holds unusable values.
    #[error("invalid config: {0}")]
    Config(String),

    /// YAML parse error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error on the terminal or a worker thread.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog source could not be constructed.
    #[error(transparent)]
    Geo(#[from] GeoError),

    /// An input line is not a known command.
    #[error("invalid command: {0}")]
    InvalidCommand(String),
}

/// Result type alias for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
