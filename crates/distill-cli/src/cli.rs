//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Distill CLI - Build a question/answer dataset from a document.
#[derive(Debug, Parser)]
#[command(name = "distill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.distill/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `distill_pipeline=debug` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process a document into the dataset, resuming any previous run
    Run(RunArgs),

    /// Show what the checkpoint currently holds
    Status(StatusArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Input document
    pub input: Option<PathBuf>,

    /// Final dataset path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Checkpoint path
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,

    /// Window size in characters
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive windows
    #[arg(long)]
    pub chunk_overlap: Option<usize>,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Extraction service provider
    #[arg(short, long, value_enum)]
    pub provider: Option<ProviderArg>,

    /// File with a custom prompt template containing `{context}`
    #[arg(long)]
    pub prompt_template: Option<PathBuf>,

    /// Upper bound on a single service call, in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// API key for the OpenAI provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Arguments for the status command.
#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Checkpoint path
    #[arg(long)]
    pub checkpoint: Option<PathBuf>,
}

/// Provider argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ProviderArg {
    /// OpenAI-compatible chat completions API
    Openai,
    /// Local Ollama server
    Ollama,
}

impl From<ProviderArg> for crate::config::ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Openai => crate::config::ProviderKind::OpenAi,
            ProviderArg::Ollama => crate::config::ProviderKind::Ollama,
        }
    }
}
