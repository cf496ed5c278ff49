//! Error types for the pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a pipeline operation
///
/// Per-chunk problems (service failures, malformed responses) are not errors
/// at this level; they are reported as [`crate::ChunkOutcome`] values and the
/// run carries on.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input document does not exist
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input document has no content
    #[error("Input file is empty: {}", .0.display())]
    EmptyInput(PathBuf),

    /// Checkpoint log could not be read or written
    #[error("Checkpoint error ({}): {source}", path.display())]
    Checkpoint {
        /// Checkpoint file path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// Final dataset could not be written
    #[error("Output error ({}): {source}", path.display())]
    Output {
        /// Output file path
        path: PathBuf,
        /// Underlying I/O failure
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(String),

    /// Other I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Json(e.to_string())
    }
}
