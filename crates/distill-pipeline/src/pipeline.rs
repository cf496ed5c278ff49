//! Pipeline controller: resume, submit, validate, checkpoint

use crate::cancel::CancellationToken;
use crate::checkpoint::CheckpointStore;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::parser::parse_response;
use crate::prompt::PromptBuilder;
use crate::types::{ChunkOutcome, RejectReason, RunOutcome, RunReport, ValidatedRecord};
use crate::validator::RecordValidator;
use distill_domain::{Chunk, ExtractionService, RunId};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{info, info_span, warn, Instrument};

/// Drives chunks through the extraction service into the checkpoint
///
/// The pipeline never consolidates by itself. [`Pipeline::run`] reports a
/// [`RunOutcome`] and the caller invokes [`crate::consolidate`] only for
/// [`RunOutcome::Completed`].
pub struct Pipeline<S>
where
    S: ExtractionService,
{
    service: S,
    store: CheckpointStore,
    prompt: PromptBuilder,
    validator: RecordValidator,
    config: PipelineConfig,
}

impl<S> Pipeline<S>
where
    S: ExtractionService,
    S::Error: Display,
{
    /// Create a new pipeline
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is invalid.
    pub fn new(
        service: S,
        store: CheckpointStore,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            service,
            store,
            prompt: PromptBuilder::default(),
            validator: RecordValidator::from_config(&config),
            config,
        })
    }

    /// Use a custom prompt template
    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    /// The checkpoint store this pipeline appends to
    pub fn store(&self) -> &CheckpointStore {
        &self.store
    }

    /// Mutable access to the checkpoint store, for consolidation
    pub fn store_mut(&mut self) -> &mut CheckpointStore {
        &mut self.store
    }

    /// The extraction service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Process every chunk not yet in the checkpoint, in ascending order
    ///
    /// Per-chunk failures are logged and leave the chunk unrecorded so a
    /// later run retries it. Cancellation is honoured between chunks and
    /// while a service call is in flight.
    ///
    /// # Errors
    ///
    /// Only checkpoint I/O failures abort the run.
    pub async fn run(
        &mut self,
        chunks: &[Chunk],
        cancel: &CancellationToken,
    ) -> Result<RunReport, PipelineError> {
        let run_id = RunId::new();
        let span = info_span!("run", %run_id, model = %self.service.model_name());
        self.run_chunks(run_id, chunks, cancel).instrument(span).await
    }

    async fn run_chunks(
        &mut self,
        run_id: RunId,
        chunks: &[Chunk],
        cancel: &CancellationToken,
    ) -> Result<RunReport, PipelineError> {
        let started = Instant::now();
        let processed = self.resume_point()?;
        let mut report = RunReport::new(run_id, chunks.len());

        info!("Processing {} chunks with {}", chunks.len(), self.service.model_name());

        let mut completed = true;
        for chunk in chunks {
            if cancel.is_cancelled() {
                info!("Cancellation observed before chunk {}", chunk.index());
                completed = false;
                break;
            }

            let outcome = if processed.contains(&chunk.index()) {
                ChunkOutcome::Skipped
            } else {
                match self.process_chunk(chunk, chunks.len(), cancel).await? {
                    Some(outcome) => outcome,
                    None => {
                        completed = false;
                        break;
                    }
                }
            };
            report.record(&outcome);
        }

        report.outcome = if completed {
            RunOutcome::Completed
        } else {
            RunOutcome::Interrupted
        };
        report.elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            "Run {:?}: {} accepted, {} rejected, {} failed, {} skipped, {} records appended",
            report.outcome,
            report.accepted,
            report.rejected,
            report.failed,
            report.skipped,
            report.records_appended
        );
        Ok(report)
    }

    fn resume_point(&self) -> Result<BTreeSet<usize>, PipelineError> {
        let scan = self.store.scan()?;
        if scan.skipped_lines > 0 {
            warn!("Ignored {} malformed checkpoint lines", scan.skipped_lines);
        }
        if !scan.processed.is_empty() {
            info!(
                "Resuming from {}: {} chunks already processed ({} records)",
                self.store.path().display(),
                scan.processed.len(),
                scan.records
            );
        }
        Ok(scan.processed)
    }

    /// Submit one chunk; `None` means cancellation abandoned the call
    async fn process_chunk(
        &mut self,
        chunk: &Chunk,
        total: usize,
        cancel: &CancellationToken,
    ) -> Result<Option<ChunkOutcome>, PipelineError> {
        info!("Processing chunk {}/{}", chunk.index() + 1, total);
        let prompt = self.prompt.build(chunk.text());

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Abandoned in-flight call for chunk {}", chunk.index());
                return Ok(None);
            }
            response = self.call_service(&prompt) => response,
        };

        let outcome = match response {
            Err(reason) => {
                warn!("Chunk {} failed: {}; leaving it for the next run", chunk.index(), reason);
                ChunkOutcome::Failed(reason)
            }
            Ok(text) => match self.interpret(&text) {
                Ok(records) => {
                    let written = self.store.append(chunk.index(), &records)?;
                    info!("Chunk {} accepted: {} records saved", chunk.index(), written);
                    ChunkOutcome::Accepted(written)
                }
                Err(reason) => {
                    warn!("Chunk {} rejected: {}", chunk.index(), reason);
                    ChunkOutcome::Rejected(reason)
                }
            },
        };
        Ok(Some(outcome))
    }

    async fn call_service(&self, prompt: &str) -> Result<String, String> {
        let call = self.service.complete(prompt);
        match self.config.request_timeout() {
            Some(limit) => match timeout(limit, call).await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(_) => Err(format!("timed out after {}s", limit.as_secs())),
            },
            None => call.await.map_err(|e| e.to_string()),
        }
    }

    fn interpret(&self, response: &str) -> Result<Vec<ValidatedRecord>, RejectReason> {
        let records = parse_response(response, &self.validator)?;
        if records.is_empty() {
            return Err(RejectReason::Empty);
        }
        Ok(records)
    }
}
