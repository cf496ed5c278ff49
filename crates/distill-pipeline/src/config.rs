//! Configuration for the pipeline

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Field every accepted record must carry: the question
pub const DEFAULT_QUESTION_FIELD: &str = "user_question";

/// Field every accepted record must carry: the answer
pub const DEFAULT_ANSWER_FIELD: &str = "concise_answer";

/// Configuration for a pipeline run
///
/// Passed explicitly to [`crate::Pipeline::new`]; nothing is read from the
/// environment at this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Model identifier handed to the extraction service
    pub model: String,

    /// Sampling temperature (0.0 keeps output deterministic)
    pub temperature: f32,

    /// Window size in characters
    pub chunk_size: usize,

    /// Characters shared between consecutive windows
    pub chunk_overlap: usize,

    /// Name of the mandatory question field
    pub question_field: String,

    /// Name of the mandatory answer field
    pub answer_field: String,

    /// Upper bound on a single service call (seconds). `None` waits forever,
    /// so a hung service blocks the whole run.
    pub request_timeout_secs: Option<u64>,

    /// File holding a custom prompt template; must contain `{context}`
    pub prompt_template: Option<PathBuf>,
}

impl PipelineConfig {
    /// Get the request timeout as a Duration, if one is set
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.model.trim().is_empty() {
            return Err(config_error("model must not be empty"));
        }
        if self.chunk_size == 0 {
            return Err(config_error("chunk_size must be greater than 0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(config_error("chunk_overlap must be smaller than chunk_size"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(config_error("temperature must be within [0.0, 2.0]"));
        }
        if self.question_field.is_empty() || self.answer_field.is_empty() {
            return Err(config_error("required field names must not be empty"));
        }
        if self.question_field == self.answer_field {
            return Err(config_error("question_field and answer_field must differ"));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(config_error("request_timeout_secs must be greater than 0"));
        }
        Ok(())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        toml::from_str(toml_str)
            .map_err(|e| PipelineError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            chunk_size: 4000,
            chunk_overlap: 200,
            question_field: DEFAULT_QUESTION_FIELD.to_string(),
            answer_field: DEFAULT_ANSWER_FIELD.to_string(),
            request_timeout_secs: None,
            prompt_template: None,
        }
    }
}

fn config_error(message: &str) -> PipelineError {
    PipelineError::Config(message.to_string())
}
