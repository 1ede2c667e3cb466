//! CLI error type.

use risk_cube::CubeError;
use risk_greeks::{ConfigError, GreeksError};
use thiserror::Error;

/// Errors surfaced by the `greeks` binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be built.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The risk run failed.
    #[error("Risk calculation failed: {0}")]
    Greeks(#[from] GreeksError),

    /// Report post-processing failed.
    #[error("Cube error: {0}")]
    Cube(#[from] CubeError),

    /// Output could not be written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialisation failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialisation failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A command-line argument was rejected.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// CLI result alias.
pub type Result<T> = std::result::Result<T, CliError>;
