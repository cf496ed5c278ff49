//! Distill Domain Layer
//!
//! Core vocabulary shared by every other crate in the workspace. It has no
//! external dependencies apart from `uuid` and defines the value types and
//! trait boundaries that the pipeline and providers build on.
//!
//! ## Key Concepts
//!
//! - **Chunk**: an indexed window of the source document, the unit of work
//! - **RunId**: identifier attached to a single pipeline run
//! - **ExtractionService**: the external system that turns chunk text into
//!   candidate records
//!
//! ## Architecture
//!
//! - No infrastructure code lives here
//! - Providers implement [`traits::ExtractionService`] in `distill-llm`
//! - The pipeline consumes these types in `distill-pipeline`

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod run;
pub mod traits;

// Re-exports for convenience
pub use chunk::{Chunk, ChunkIndex};
pub use run::RunId;
pub use traits::ExtractionService;
