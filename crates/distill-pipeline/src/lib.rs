//! Distill Pipeline
//!
//! Turns a document into a JSONL dataset of question/answer records by
//! sending overlapping chunks of it through an extraction service.
//!
//! # Overview
//!
//! Every chunk is rendered into a prompt and submitted to an
//! [`ExtractionService`](distill_domain::ExtractionService). The response is
//! cleaned of Markdown fences, parsed as a JSON array and filtered down to
//! records carrying both mandatory fields. Accepted records are appended to a
//! durable checkpoint log tagged with their chunk index, so an interrupted
//! run resumes where it stopped. Once every chunk has been attempted the
//! checkpoint is consolidated into the final dataset and removed.
//!
//! # Architecture
//!
//! ```text
//! Document → Chunker → Pipeline → Service → Cleaner → Validator → Checkpoint
//!                                                                     ↓
//!                                                    Dataset ← Consolidator
//! ```
//!
//! # Example Usage
//!
//! ```no_run
//! use distill_llm::MockProvider;
//! use distill_pipeline::{
//!     cancellation, consolidate, CheckpointStore, Chunker, Pipeline, PipelineConfig,
//! };
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::default();
//! let chunks = Chunker::from_config(&config)?.chunk("Some long document ...");
//!
//! let store = CheckpointStore::new("dataset_partial.jsonl");
//! let mut pipeline = Pipeline::new(MockProvider::default(), store, config)?;
//!
//! let (_handle, token) = cancellation();
//! let report = pipeline.run(&chunks, &token).await?;
//!
//! if report.is_completed() {
//!     let written = consolidate(pipeline.store_mut(), Path::new("dataset.jsonl"))?;
//!     println!("{} records", written.records_written);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod cancel;
mod checkpoint;
mod chunking;
mod config;
mod consolidate;
mod error;
mod loader;
mod parser;
mod pipeline;
mod prompt;
mod types;
mod validator;

#[cfg(test)]
mod tests;

pub use cancel::{cancellation, CancelHandle, CancellationToken};
pub use checkpoint::CheckpointStore;
pub use chunking::Chunker;
pub use config::{PipelineConfig, DEFAULT_ANSWER_FIELD, DEFAULT_MODEL, DEFAULT_QUESTION_FIELD};
pub use consolidate::consolidate;
pub use error::PipelineError;
pub use loader::load_document;
pub use parser::{clean_response, parse_response};
pub use pipeline::Pipeline;
pub use prompt::{PromptBuilder, CONTEXT_PLACEHOLDER, DEFAULT_TEMPLATE};
pub use types::{
    CheckpointRecord, ChunkOutcome, ConsolidationReport, RejectReason, RunOutcome, RunReport,
    ScanReport, ValidatedRecord,
};
