//! Distill LLM Provider Layer
//!
//! Pluggable implementations of the [`ExtractionService`] trait from
//! `distill-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic scripted mock for testing
//! - `OpenAiProvider`: OpenAI-compatible chat completions API
//! - `OllamaProvider`: Local Ollama API integration
//!
//! None of the providers retry. A failed call surfaces as an error and the
//! pipeline leaves that chunk for the next run.
//!
//! # Examples
//!
//! ```
//! use distill_llm::MockProvider;
//! use distill_domain::ExtractionService;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let provider = MockProvider::new("[]");
//! let result = provider.complete("test prompt").await.unwrap();
//! assert_eq!(result, "[]");
//! # }
//! ```

#![warn(missing_docs)]

pub mod ollama;
pub mod openai;

use distill_domain::ExtractionService;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

/// Errors that can occur while calling an extraction service
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or transport failure (connection refused, timeout, TLS)
    #[error("Communication error: {0}")]
    Communication(String),

    /// Service answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code returned by the service
        status: u16,
        /// Response body, if it could be read
        body: String,
    },

    /// Response envelope could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Provider misconfiguration (bad key, bad URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            LlmError::InvalidResponse(e.to_string())
        } else {
            LlmError::Communication(e.to_string())
        }
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

/// Mock extraction service for deterministic testing
///
/// Returns pre-configured responses without making any network calls. A
/// scripted reply is selected by the first registered needle that occurs in
/// the prompt, so tests can key replies on the chunk text embedded in it.
///
/// # Examples
///
/// ```
/// use distill_llm::MockProvider;
/// use distill_domain::ExtractionService;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut provider = MockProvider::default();
/// provider.add_response("alpha", r#"[{"user_question": "q", "concise_answer": "a"}]"#);
/// provider.add_error("broken");
///
/// assert!(provider.complete("... alpha ...").await.unwrap().contains("user_question"));
/// assert!(provider.complete("... broken ...").await.is_err());
/// assert_eq!(provider.call_count(), 2);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    model: String,
    replies: Arc<Mutex<Vec<(String, MockReply)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            model: "mock".to_string(),
            replies: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Reply with `response` to any prompt containing `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        lock(&self.replies).push((needle.into(), MockReply::Text(response.into())));
    }

    /// Fail any prompt containing `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        lock(&self.replies).push((needle.into(), MockReply::Error));
    }

    /// Get the number of times the service was called
    pub fn call_count(&self) -> usize {
        lock(&self.prompts).len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }

    /// Number of received prompts that contain `needle`
    pub fn calls_containing(&self, needle: &str) -> usize {
        lock(&self.prompts)
            .iter()
            .filter(|prompt| prompt.contains(needle))
            .count()
    }

    fn reply_for(&self, prompt: &str) -> Result<String, LlmError> {
        lock(&self.prompts).push(prompt.to_string());

        let replies = lock(&self.replies);
        match replies.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            Some((_, MockReply::Text(response))) => Ok(response.clone()),
            Some((_, MockReply::Error)) => Err(LlmError::Other("Mock error".to_string())),
            None => Ok(self.default_response.clone()),
        }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("[]")
    }
}

impl ExtractionService for MockProvider {
    type Error = LlmError;

    async fn complete(&self, prompt: &str) -> Result<String, Self::Error> {
        self.reply_for(prompt)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

// A poisoned mutex only means another test thread panicked mid-call; the
// recorded data is still usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
