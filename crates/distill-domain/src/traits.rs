//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use std::future::Future;

/// The external extraction service
///
/// Given a fully rendered prompt, returns the raw response text. Latency and
/// availability are unspecified and the response may be malformed; callers
/// validate everything they receive.
///
/// Implemented by the infrastructure layer (distill-llm)
pub trait ExtractionService {
    /// Error type for service calls
    type Error;

    /// Submit a prompt and wait for the raw response text
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, Self::Error>> + Send;

    /// Identifier of the model behind this service, for logs and reports
    fn model_name(&self) -> &str;
}
