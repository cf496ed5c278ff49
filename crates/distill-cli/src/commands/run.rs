//! Run command implementation.

use crate::cli::RunArgs;
use crate::config::{Config, ProviderKind};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use distill_domain::ExtractionService;
use distill_llm::{OllamaProvider, OpenAiProvider};
use distill_pipeline::{
    cancellation, consolidate, load_document, CheckpointStore, Chunker, Pipeline, PromptBuilder,
    RunOutcome,
};
use std::fmt::Display;
use std::path::PathBuf;
use tracing::{info, warn};

/// Execute the run command.
///
/// Every precondition (configuration, credentials, prompt template, input)
/// is checked before the checkpoint or the dataset is touched.
pub async fn execute_run(args: RunArgs, mut config: Config, formatter: &Formatter) -> Result<()> {
    config.apply_run_args(&args);
    config.pipeline.validate()?;

    let input = config
        .paths
        .input
        .clone()
        .ok_or_else(|| CliError::InvalidInput("No input document given".to_string()))?;

    match config.service.provider {
        ProviderKind::OpenAi => {
            let api_key = args
                .api_key
                .as_deref()
                .filter(|key| !key.trim().is_empty())
                .ok_or(CliError::MissingApiKey)?;
            let provider = OpenAiProvider::new(api_key, config.pipeline.model.clone())?
                .with_base_url(config.service.base_url.clone())
                .with_temperature(config.pipeline.temperature);
            run_with(provider, &config, input, formatter).await
        }
        ProviderKind::Ollama => {
            let provider = OllamaProvider::new(
                config.service.ollama_endpoint.clone(),
                config.pipeline.model.clone(),
            )?
            .with_temperature(config.pipeline.temperature);
            run_with(provider, &config, input, formatter).await
        }
    }
}

async fn run_with<S>(service: S, config: &Config, input: PathBuf, formatter: &Formatter) -> Result<()>
where
    S: ExtractionService,
    S::Error: Display,
{
    let prompt = PromptBuilder::from_config(&config.pipeline)?;
    let blocks = load_document(&input)?;
    let chunks = Chunker::from_config(&config.pipeline)?.chunk_blocks(&blocks);
    info!("Split {} into {} chunks", input.display(), chunks.len());

    if config.pipeline.request_timeout().is_none() {
        warn!("No request timeout configured; a hung service call blocks the run until interrupted");
    }

    let store = CheckpointStore::new(&config.paths.checkpoint);
    let mut pipeline = Pipeline::new(service, store, config.pipeline.clone())?.with_prompt(prompt);

    let (handle, token) = cancellation();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping");
            handle.cancel();
        }
    });

    let report = pipeline.run(&chunks, &token).await;
    interrupt.abort();
    let report = report?;

    println!("{}", formatter.run_summary(&report));

    match report.outcome {
        RunOutcome::Completed => {
            let written = consolidate(pipeline.store_mut(), &config.paths.output)?;
            println!("{}", formatter.dataset_written(&written));
        }
        RunOutcome::Interrupted => {
            let scan = pipeline.store().scan()?;
            println!(
                "{}",
                formatter.run_interrupted(scan.records, pipeline.store().path())
            );
        }
    }

    Ok(())
}
