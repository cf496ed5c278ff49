//! Integration tests for the Pipeline

#[cfg(test)]
mod tests {
    use crate::{
        cancellation, consolidate, CancelHandle, CancellationToken, CheckpointStore, Pipeline,
        PipelineConfig, RunOutcome,
    };
    use distill_domain::{Chunk, ExtractionService};
    use distill_llm::{LlmError, MockProvider};
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    const FIRST: &str = "CHUNK-ZERO-TEXT";
    const SECOND: &str = "CHUNK-ONE-TEXT";
    const THIRD: &str = "CHUNK-TWO-TEXT";

    fn three_chunks() -> Vec<Chunk> {
        vec![
            Chunk::new(0, FIRST),
            Chunk::new(1, SECOND),
            Chunk::new(2, THIRD),
        ]
    }

    fn scripted_provider() -> MockProvider {
        let mut llm = MockProvider::default();
        llm.add_response(
            FIRST,
            r#"```json
[
  {"user_question": "c0q1", "concise_answer": "c0a1"},
  {"user_question": "c0q2", "concise_answer": "c0a2"}
]
```"#,
        );
        llm.add_response(SECOND, "[]");
        llm.add_response(
            THIRD,
            r#"[{"user_question": "c2q1", "concise_answer": "c2a1", "keywords": ["x"]}]"#,
        );
        llm
    }

    fn lines(path: &Path) -> Vec<Value> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    /// Cancels the run as soon as a prompt containing `needle` is submitted
    struct CancelOn {
        inner: MockProvider,
        needle: &'static str,
        handle: CancelHandle,
    }

    impl ExtractionService for CancelOn {
        type Error = LlmError;

        async fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
            if prompt.contains(self.needle) {
                self.handle.cancel();
            }
            self.inner.complete(prompt).await
        }

        fn model_name(&self) -> &str {
            self.inner.model_name()
        }
    }

    /// Never answers
    struct Hanging;

    impl ExtractionService for Hanging {
        type Error = LlmError;

        async fn complete(&self, _prompt: &str) -> Result<String, Self::Error> {
            std::future::pending().await
        }

        fn model_name(&self) -> &str {
            "hanging"
        }
    }

    #[tokio::test]
    async fn test_completed_run_consolidates_in_chunk_order() {
        let dir = TempDir::new().unwrap();
        let checkpoint = dir.path().join("dataset_partial.jsonl");
        let output = dir.path().join("dataset.jsonl");

        let store = CheckpointStore::new(&checkpoint);
        let mut pipeline =
            Pipeline::new(scripted_provider(), store, PipelineConfig::default()).unwrap();

        let report = pipeline
            .run(&three_chunks(), &CancellationToken::never())
            .await
            .unwrap();

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.records_appended, 3);
        assert_eq!(report.chunks_visited(), 3);

        let written = consolidate(pipeline.store_mut(), &output).unwrap();
        assert_eq!(written.records_written, 3);

        let questions: Vec<_> = lines(&output)
            .iter()
            .map(|record| record["user_question"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(questions, vec!["c0q1", "c0q2", "c2q1"]);
        assert!(!checkpoint.exists());
    }

    #[tokio::test]
    async fn test_interrupted_run_keeps_checkpoint_and_resumes() {
        let dir = TempDir::new().unwrap();
        let checkpoint = dir.path().join("dataset_partial.jsonl");
        let output = dir.path().join("dataset.jsonl");
        let llm = scripted_provider();

        let (handle, token) = cancellation();
        let service = CancelOn {
            inner: llm.clone(),
            needle: SECOND,
            handle,
        };
        let mut pipeline = Pipeline::new(
            service,
            CheckpointStore::new(&checkpoint),
            PipelineConfig::default(),
        )
        .unwrap();

        let report = pipeline.run(&three_chunks(), &token).await.unwrap();
        assert_eq!(report.outcome, RunOutcome::Interrupted);
        assert!(!report.is_completed());
        assert_eq!(llm.calls_containing(THIRD), 0);

        let stored = lines(&checkpoint);
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|line| line["chunk_index"] == 0));
        assert!(!output.exists());

        // Resume with a fresh token: chunk 0 is never resubmitted
        let mut resumed = Pipeline::new(
            llm.clone(),
            CheckpointStore::new(&checkpoint),
            PipelineConfig::default(),
        )
        .unwrap();
        let report = resumed
            .run(&three_chunks(), &CancellationToken::never())
            .await
            .unwrap();

        assert!(report.is_completed());
        assert_eq!(report.skipped, 1);
        assert_eq!(llm.calls_containing(FIRST), 1);
        assert_eq!(llm.calls_containing(THIRD), 1);

        consolidate(resumed.store_mut(), &output).unwrap();
        assert_eq!(lines(&output).len(), 3);
        assert!(!checkpoint.exists());
    }

    #[tokio::test]
    async fn test_failed_and_malformed_chunks_stay_unrecorded() {
        let dir = TempDir::new().unwrap();
        let checkpoint = dir.path().join("partial.jsonl");

        let mut llm = MockProvider::default();
        llm.add_error(FIRST);
        llm.add_response(SECOND, "Sorry, I cannot help with that.");
        llm.add_response(THIRD, r#"{"user_question": "q", "concise_answer": "a"}"#);

        let mut pipeline =
            Pipeline::new(llm, CheckpointStore::new(&checkpoint), PipelineConfig::default())
                .unwrap();
        let report = pipeline
            .run(&three_chunks(), &CancellationToken::never())
            .await
            .unwrap();

        assert!(report.is_completed());
        assert_eq!(report.failed, 1);
        assert_eq!(report.rejected, 2);
        assert_eq!(report.records_appended, 0);
        assert!(pipeline.store().scan().unwrap().processed.is_empty());
    }

    #[tokio::test]
    async fn test_partially_valid_response_keeps_valid_subsequence() {
        let dir = TempDir::new().unwrap();
        let checkpoint = dir.path().join("partial.jsonl");

        let llm = MockProvider::new(
            r#"[
                {"user_question": "keep-1", "concise_answer": "a"},
                {"user_question": "missing answer"},
                "not an object",
                {"user_question": "keep-2", "concise_answer": "b"}
            ]"#,
        );
        let mut pipeline =
            Pipeline::new(llm, CheckpointStore::new(&checkpoint), PipelineConfig::default())
                .unwrap();
        let report = pipeline
            .run(&[Chunk::new(0, "only chunk")], &CancellationToken::never())
            .await
            .unwrap();

        assert_eq!(report.records_appended, 2);
        let questions: Vec<_> = lines(&checkpoint)
            .iter()
            .map(|line| line["content"]["user_question"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(questions, vec!["keep-1", "keep-2"]);
    }

    #[tokio::test]
    async fn test_empty_chunk_list_completes() {
        let dir = TempDir::new().unwrap();
        let llm = MockProvider::default();
        let mut pipeline = Pipeline::new(
            llm.clone(),
            CheckpointStore::new(dir.path().join("partial.jsonl")),
            PipelineConfig::default(),
        )
        .unwrap();

        let report = pipeline.run(&[], &CancellationToken::never()).await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Completed);
        assert_eq!(report.total_chunks, 0);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_pre_cancelled_run_issues_no_calls() {
        let dir = TempDir::new().unwrap();
        let llm = scripted_provider();
        let mut pipeline = Pipeline::new(
            llm.clone(),
            CheckpointStore::new(dir.path().join("partial.jsonl")),
            PipelineConfig::default(),
        )
        .unwrap();

        let (handle, token) = cancellation();
        handle.cancel();
        let report = pipeline.run(&three_chunks(), &token).await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Interrupted);
        assert_eq!(report.chunks_visited(), 0);
        assert_eq!(llm.call_count(), 0);
        assert!(!pipeline.store().exists());
    }

    #[tokio::test]
    async fn test_cancel_abandons_in_flight_call() {
        let dir = TempDir::new().unwrap();
        let mut pipeline = Pipeline::new(
            Hanging,
            CheckpointStore::new(dir.path().join("partial.jsonl")),
            PipelineConfig::default(),
        )
        .unwrap();

        let (handle, token) = cancellation();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            handle.cancel();
        });

        let report = pipeline.run(&three_chunks(), &token).await.unwrap();

        assert_eq!(report.outcome, RunOutcome::Interrupted);
        assert_eq!(report.chunks_visited(), 0);
    }

    #[tokio::test]
    async fn test_timeout_marks_chunk_failed() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            request_timeout_secs: Some(1),
            ..PipelineConfig::default()
        };
        let mut pipeline = Pipeline::new(
            Hanging,
            CheckpointStore::new(dir.path().join("partial.jsonl")),
            config,
        )
        .unwrap();

        let report = pipeline
            .run(&[Chunk::new(0, "slow")], &CancellationToken::never())
            .await
            .unwrap();

        assert!(report.is_completed());
        assert_eq!(report.failed, 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = PipelineConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..PipelineConfig::default()
        };
        let result = Pipeline::new(
            MockProvider::default(),
            CheckpointStore::new("unused.jsonl"),
            config,
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_custom_fields_are_validated() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig {
            question_field: "q".to_string(),
            answer_field: "a".to_string(),
            ..PipelineConfig::default()
        };
        let llm = MockProvider::new(
            r#"[{"q": "kept", "a": "yes"}, {"user_question": "x", "concise_answer": "y"}]"#,
        );
        let mut pipeline =
            Pipeline::new(llm, CheckpointStore::new(dir.path().join("p.jsonl")), config).unwrap();

        let report = pipeline
            .run(&[Chunk::new(0, "text")], &CancellationToken::never())
            .await
            .unwrap();

        assert_eq!(report.records_appended, 1);
    }
}
