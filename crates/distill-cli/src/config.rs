//! Configuration management for the CLI.

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use distill_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Chunking, model and validation settings
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Extraction service settings
    #[serde(default)]
    pub service: ServiceSettings,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathSettings,
}

/// Extraction service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Which provider to talk to
    #[serde(default)]
    pub provider: ProviderKind,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Ollama server endpoint
    #[serde(default = "default_ollama_endpoint")]
    pub ollama_endpoint: String,
}

/// Extraction service provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completions API
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Input document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<PathBuf>,

    /// Final dataset
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Checkpoint log
    #[serde(default = "default_checkpoint")]
    pub checkpoint: PathBuf,
}

impl Config {
    /// Get the default configuration file path.
    pub fn path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".distill").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. The default path is optional and falls
    /// back to built-in defaults when absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply command-line overrides for a run.
    pub fn apply_run_args(&mut self, args: &RunArgs) {
        if let Some(input) = &args.input {
            self.paths.input = Some(input.clone());
        }
        if let Some(output) = &args.output {
            self.paths.output = output.clone();
        }
        if let Some(checkpoint) = &args.checkpoint {
            self.paths.checkpoint = checkpoint.clone();
        }
        if let Some(size) = args.chunk_size {
            self.pipeline.chunk_size = size;
        }
        if let Some(overlap) = args.chunk_overlap {
            self.pipeline.chunk_overlap = overlap;
        }
        if let Some(model) = &args.model {
            self.pipeline.model = model.clone();
        }
        if let Some(provider) = args.provider {
            self.service.provider = provider.into();
        }
        if let Some(template) = &args.prompt_template {
            self.pipeline.prompt_template = Some(template.clone());
        }
        if let Some(secs) = args.timeout_secs {
            self.pipeline.request_timeout_secs = Some(secs);
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: default_base_url(),
            ollama_endpoint: default_ollama_endpoint(),
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            input: None,
            output: default_output(),
            checkpoint: default_checkpoint(),
        }
    }
}

fn default_base_url() -> String {
    distill_llm::openai::DEFAULT_BASE_URL.to_string()
}

fn default_ollama_endpoint() -> String {
    distill_llm::ollama::DEFAULT_ENDPOINT.to_string()
}

fn default_output() -> PathBuf {
    PathBuf::from("dataset.jsonl")
}

fn default_checkpoint() -> PathBuf {
    PathBuf::from("dataset_partial.jsonl")
}
