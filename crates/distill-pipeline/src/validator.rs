//! Structural validation of extracted records

use crate::config::{PipelineConfig, DEFAULT_ANSWER_FIELD, DEFAULT_QUESTION_FIELD};
use crate::types::{RejectReason, ValidatedRecord};
use serde_json::{Map, Value};
use tracing::debug;

/// Keeps the elements of a payload that carry both required fields
///
/// Only structure is checked: an element must be an object whose question
/// and answer fields are present and non-null. The rest of the schema is
/// opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordValidator {
    question_field: String,
    answer_field: String,
}

impl RecordValidator {
    /// Create a validator for the given field names
    pub fn new(question_field: impl Into<String>, answer_field: impl Into<String>) -> Self {
        Self {
            question_field: question_field.into(),
            answer_field: answer_field.into(),
        }
    }

    /// Create a validator from the pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.question_field.clone(), config.answer_field.clone())
    }

    /// Filter a parsed payload down to its valid records
    ///
    /// Order is preserved. Invalid elements are dropped silently; only a
    /// non-list payload is an error.
    pub fn validate(&self, payload: Value) -> Result<Vec<ValidatedRecord>, RejectReason> {
        let Value::Array(items) = payload else {
            return Err(RejectReason::NotAList);
        };

        let total = items.len();
        let records: Vec<ValidatedRecord> = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(fields) if self.accepts(&fields) => Some(ValidatedRecord::new(fields)),
                _ => None,
            })
            .collect();

        if records.len() < total {
            debug!("Dropped {} of {} elements missing required fields", total - records.len(), total);
        }
        Ok(records)
    }

    /// Whether an object carries non-null values for both required fields
    pub fn accepts(&self, fields: &Map<String, Value>) -> bool {
        [&self.question_field, &self.answer_field]
            .iter()
            .all(|key| fields.get(key.as_str()).is_some_and(|value| !value.is_null()))
    }
}

impl Default for RecordValidator {
    fn default() -> Self {
        Self::new(DEFAULT_QUESTION_FIELD, DEFAULT_ANSWER_FIELD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_not_a_list() {
        let validator = RecordValidator::default();
        assert_eq!(validator.validate(json!({"a": 1})), Err(RejectReason::NotAList));
        assert_eq!(validator.validate(json!("text")), Err(RejectReason::NotAList));
        assert_eq!(validator.validate(Value::Null), Err(RejectReason::NotAList));
    }

    #[test]
    fn test_empty_list_is_ok_and_empty() {
        let validator = RecordValidator::default();
        assert_eq!(validator.validate(json!([])), Ok(vec![]));
    }

    #[test]
    fn test_partial_tolerance_keeps_exact_valid_subsequence() {
        let validator = RecordValidator::default();
        let payload = json!([
            {"user_question": "q1", "concise_answer": "a1", "keywords": ["x"]},
            {"user_question": "q2"},
            "not an object",
            {"user_question": null, "concise_answer": "a3"},
            42,
            {"user_question": "q4", "concise_answer": ""},
            {"concise_answer": "a5"},
            {"user_question": "q6", "concise_answer": {"nested": true}},
        ]);

        let records = validator.validate(payload).unwrap();
        let questions: Vec<_> = records
            .iter()
            .map(|r| r.get("user_question").unwrap().clone())
            .collect();
        assert_eq!(questions, vec![json!("q1"), json!("q4"), json!("q6")]);
    }

    #[test]
    fn test_payload_is_carried_unchanged() {
        let validator = RecordValidator::default();
        let element = json!({
            "content_type": "Node Reference",
            "user_question": "What does the HTTP node do?",
            "concise_answer": "It sends requests.",
            "structured_data": {"key_parameters": null, "code_block": null},
            "keywords": ["http", "request"]
        });

        let records = validator.validate(json!([element.clone()])).unwrap();
        assert_eq!(records[0].clone().into_value(), element);
    }

    #[test]
    fn test_custom_field_names() {
        let validator = RecordValidator::new("prompt", "completion");
        let records = validator
            .validate(json!([
                {"prompt": "p", "completion": "c"},
                {"user_question": "q", "concise_answer": "a"}
            ]))
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("prompt").unwrap(), "p");
    }
}
