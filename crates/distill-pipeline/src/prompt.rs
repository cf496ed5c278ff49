//! Prompt template for record extraction

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use std::fs;
use std::path::Path;
use tracing::info;

/// Placeholder replaced by the chunk text
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Renders the instruction template around a chunk of text
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
}

impl PromptBuilder {
    /// Create a builder from a custom template
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the template has no
    /// `{context}` placeholder.
    pub fn new(template: impl Into<String>) -> Result<Self, PipelineError> {
        let template = template.into();
        if !template.contains(CONTEXT_PLACEHOLDER) {
            return Err(PipelineError::Config(format!(
                "prompt template must contain {}",
                CONTEXT_PLACEHOLDER
            )));
        }
        Ok(Self { template })
    }

    /// Load a custom template from a file
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the file cannot be read or has
    /// no `{context}` placeholder.
    pub fn from_file(path: &Path) -> Result<Self, PipelineError> {
        let template = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read prompt template {}: {}",
                path.display(),
                e
            ))
        })?;
        let builder = Self::new(template).map_err(|_| {
            PipelineError::Config(format!(
                "prompt template {} must contain {}",
                path.display(),
                CONTEXT_PLACEHOLDER
            ))
        })?;
        info!("Using prompt template {}", path.display());
        Ok(builder)
    }

    /// The configured template, or the default one
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        match &config.prompt_template {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Build the complete extraction prompt for one chunk
    pub fn build(&self, chunk_text: &str) -> String {
        self.template.replace(CONTEXT_PLACEHOLDER, chunk_text)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Prompt used when no custom template is configured
pub const DEFAULT_TEMPLATE: &str = r#"You are building a question-answer dataset for a retrieval-augmented generation system. Read the documentation excerpt below and turn every self-contained piece of information in it into one JSON object.

Each object must have exactly this shape:
{
  "content_type": "One of: 'General Concept', 'Node Reference', 'How-To Guide', 'Code Example', 'Configuration'",
  "section_title": "Heading of the section the information comes from",
  "user_question": "A direct question a real user would ask to find this information",
  "concise_answer": "A short, self-contained paragraph answering the question",
  "structured_data": {
    "key_parameters": [
      {"name": "Parameter, field or setting name", "description": "What it does", "example": "Example value or null"}
    ] or null,
    "code_block": "Relevant code copied exactly as written, or null"
  },
  "keywords": ["3 to 5 search keywords"]
}

Rules:
- Capture hard data: parameter tables, default values, configuration examples and code go into "structured_data".
- Never invent information. A field that does not apply is null.
- Output only a JSON list of objects: start with [ and end with ]. No introduction, no explanation.

--- TEXT TO PROCESS ---
{context}
---
"#;
