//! Record, outcome and report types

use distill_domain::{ChunkIndex, RunId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;

/// A record accepted by the validator
///
/// Only the two mandatory fields are guaranteed; the rest of the object is
/// opaque payload carried through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidatedRecord(Map<String, Value>);

impl ValidatedRecord {
    pub(crate) fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Look up a field of the record
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON value
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// One line of the checkpoint log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    /// Chunk the record was extracted from
    pub chunk_index: ChunkIndex,

    /// The accepted record
    pub content: ValidatedRecord,
}

/// Why a chunk's response was not accepted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Cleaned response did not parse as JSON
    #[error("response is not valid JSON: {0}")]
    Malformed(String),

    /// Response parsed but the top-level value is not a list
    #[error("response is not a JSON list")]
    NotAList,

    /// List contained no element carrying both required fields
    #[error("no valid records in response")]
    Empty,
}

/// Terminal state of a single chunk within a run
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// Already present in the checkpoint; the service was not called
    Skipped,

    /// Records were validated and appended to the checkpoint
    Accepted(usize),

    /// Service answered but nothing usable came back
    Rejected(RejectReason),

    /// Service call failed (transport, HTTP status, timeout)
    Failed(String),
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every chunk reached a terminal state without cancellation
    Completed,

    /// Cancellation was observed; the checkpoint is left for a resume
    Interrupted,
}

/// Summary of a pipeline run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Identifier of the run
    pub run_id: RunId,

    /// How the run ended
    pub outcome: RunOutcome,

    /// Number of chunks handed to the run
    pub total_chunks: usize,

    /// Chunks skipped because they were already checkpointed
    pub skipped: usize,

    /// Chunks accepted in this run
    pub accepted: usize,

    /// Chunks whose response was rejected
    pub rejected: usize,

    /// Chunks whose service call failed
    pub failed: usize,

    /// Records appended to the checkpoint in this run
    pub records_appended: usize,

    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
}

impl RunReport {
    pub(crate) fn new(run_id: RunId, total_chunks: usize) -> Self {
        Self {
            run_id,
            outcome: RunOutcome::Interrupted,
            total_chunks,
            skipped: 0,
            accepted: 0,
            rejected: 0,
            failed: 0,
            records_appended: 0,
            elapsed_ms: 0,
        }
    }

    pub(crate) fn record(&mut self, outcome: &ChunkOutcome) {
        match outcome {
            ChunkOutcome::Skipped => self.skipped += 1,
            ChunkOutcome::Accepted(count) => {
                self.accepted += 1;
                self.records_appended += count;
            }
            ChunkOutcome::Rejected(_) => self.rejected += 1,
            ChunkOutcome::Failed(_) => self.failed += 1,
        }
    }

    /// Chunks that reached a terminal state in this run
    pub fn chunks_visited(&self) -> usize {
        self.skipped + self.accepted + self.rejected + self.failed
    }

    /// Whether the run finished naturally and may be consolidated
    pub fn is_completed(&self) -> bool {
        self.outcome == RunOutcome::Completed
    }
}

/// Result of scanning the checkpoint log
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Chunk indices with at least one stored record
    pub processed: std::collections::BTreeSet<ChunkIndex>,

    /// Structurally valid lines
    pub records: usize,

    /// Lines skipped as corrupt
    pub skipped_lines: usize,
}

/// Result of writing the final dataset
#[derive(Debug, Clone)]
pub struct ConsolidationReport {
    /// Where the dataset was written
    pub output_path: PathBuf,

    /// Lines in the dataset
    pub records_written: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ValidatedRecord {
        match value {
            Value::Object(map) => ValidatedRecord::new(map),
            other => panic!("not an object: {}", other),
        }
    }

    // Field order and non-ASCII text survive as emitted
    #[test]
    fn test_checkpoint_record_wire_format() {
        let line = CheckpointRecord {
            chunk_index: 4,
            content: record(json!({"user_question": "¿Qué?", "concise_answer": "Esto"})),
        };
        let encoded = serde_json::to_string(&line).unwrap();
        assert_eq!(
            encoded,
            r#"{"chunk_index":4,"content":{"user_question":"¿Qué?","concise_answer":"Esto"}}"#
        );
    }

    #[test]
    fn test_checkpoint_record_rejects_non_object_content() {
        let result = serde_json::from_str::<CheckpointRecord>(r#"{"chunk_index": 1, "content": [1]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_checkpoint_record_rejects_negative_index() {
        let result = serde_json::from_str::<CheckpointRecord>(r#"{"chunk_index": -1, "content": {}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_report_counts() {
        let mut report = RunReport::new(RunId::new(), 4);
        report.record(&ChunkOutcome::Skipped);
        report.record(&ChunkOutcome::Accepted(3));
        report.record(&ChunkOutcome::Rejected(RejectReason::Empty));
        report.record(&ChunkOutcome::Failed("boom".to_string()));

        assert_eq!(report.chunks_visited(), 4);
        assert_eq!(report.records_appended, 3);
        assert!(!report.is_completed());
    }
}
