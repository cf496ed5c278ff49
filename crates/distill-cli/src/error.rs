//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No API key for a provider that needs one
    #[error("Missing API key: set OPENAI_API_KEY or pass --api-key")]
    MissingApiKey,

    /// Pipeline error
    #[error(transparent)]
    Pipeline(#[from] distill_pipeline::PipelineError),

    /// Provider construction error
    #[error("Provider error: {0}")]
    Llm(#[from] distill_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
