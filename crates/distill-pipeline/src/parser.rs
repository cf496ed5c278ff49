//! Recover a JSON payload from raw service output

use crate::types::{RejectReason, ValidatedRecord};
use crate::validator::RecordValidator;
use serde_json::Value;

const FENCE: &str = "```";

/// Strip Markdown fencing from a service response
///
/// Returns the inner content of the first complete fenced block (opening
/// fence optionally tagged, e.g. ```` ```json ````), trimmed. Without a
/// complete fence the trimmed response is returned. Text inside the fence is
/// never altered, so the result may still fail to parse.
pub fn clean_response(response: &str) -> &str {
    fenced_block(response).unwrap_or(response).trim()
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find(FENCE)?;
    let after_open = &text[open + FENCE.len()..];
    let body = &after_open[tag_len(after_open)..];
    let close = body.find(FENCE)?;
    Some(&body[..close])
}

// A tag is a run of alphanumerics directly after the fence, ended by whitespace
fn tag_len(after_fence: &str) -> usize {
    let len = after_fence
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(after_fence.len());
    match after_fence[len..].chars().next() {
        Some(c) if len > 0 && c.is_whitespace() => len,
        _ => 0,
    }
}

/// Clean, parse and validate one service response
///
/// # Errors
///
/// - [`RejectReason::Malformed`] if the cleaned text is not JSON
/// - [`RejectReason::NotAList`] if the JSON is not an array
///
/// An array with no valid elements yields `Ok` with an empty vector; deciding
/// what an empty result means is up to the caller.
pub fn parse_response(
    response: &str,
    validator: &RecordValidator,
) -> Result<Vec<ValidatedRecord>, RejectReason> {
    let payload: Value = serde_json::from_str(clean_response(response))
        .map_err(|e| RejectReason::Malformed(e.to_string()))?;
    validator.validate(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unfenced_text_is_trimmed_only() {
        let response = "  \n[{\"a\": 1}]\n\t";
        assert_eq!(clean_response(response), "[{\"a\": 1}]");
    }

    #[test]
    fn test_unfenced_prose_is_unchanged() {
        let response = "Here is your data: [1, 2]";
        assert_eq!(clean_response(response), response);
    }

    #[test]
    fn test_json_tagged_fence() {
        let response = "```json\n[{\"key\": \"value\"}]\n```";
        assert_eq!(clean_response(response), "[{\"key\": \"value\"}]");
    }

    #[test]
    fn test_untagged_fence() {
        let response = "```\n[1, 2, 3]\n```";
        assert_eq!(clean_response(response), "[1, 2, 3]");
    }

    #[test]
    fn test_fence_surrounded_by_prose() {
        let response = "Sure! Here are the records:\n```json\n[]\n```\nLet me know if you need more.";
        assert_eq!(clean_response(response), "[]");
    }

    #[test]
    fn test_inline_fence_without_tag() {
        assert_eq!(clean_response("```[true]```"), "[true]");
    }

    #[test]
    fn test_fence_content_is_preserved() {
        let inner = "[{\"code_block\": \"let x = 1;\\n  let y = 2;\"}]";
        let response = format!("```JSON\n{}\n```", inner);
        assert_eq!(clean_response(&response), inner);
    }

    #[test]
    fn test_only_first_block_is_used() {
        let response = "```json\n[1]\n```\n```json\n[2]\n```";
        assert_eq!(clean_response(response), "[1]");
    }

    #[test]
    fn test_unterminated_fence_falls_back_to_raw() {
        let response = "```json\n[1, 2";
        assert_eq!(clean_response(response), response);
    }

    #[test]
    fn test_parse_response_malformed() {
        let validator = RecordValidator::default();
        let result = parse_response("This is not JSON", &validator);
        assert!(matches!(result, Err(RejectReason::Malformed(_))));
    }

    #[test]
    fn test_parse_response_not_a_list() {
        let validator = RecordValidator::default();
        let result = parse_response(r#"{"user_question": "q", "concise_answer": "a"}"#, &validator);
        assert_eq!(result, Err(RejectReason::NotAList));
    }

    #[test]
    fn test_parse_fenced_records() {
        let validator = RecordValidator::default();
        let response = r#"```json
[
    {"user_question": "How do I add a node?", "concise_answer": "Click the plus button."}
]
```"#;
        let records = parse_response(response, &validator).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("user_question").unwrap(), "How do I add a node?");
    }
}
