//! Input document loading

use crate::error::PipelineError;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::info;

/// Load the input document as an ordered list of text blocks
///
/// This is the fail-fast precondition check of a run: it touches nothing
/// and must succeed before any service call or checkpoint write.
///
/// # Errors
///
/// - [`PipelineError::InputNotFound`] if the path does not exist
/// - [`PipelineError::EmptyInput`] if the file is empty or whitespace only
/// - [`PipelineError::Io`] if the file cannot be read as UTF-8
pub fn load_document(path: &Path) -> Result<Vec<String>, PipelineError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::InputNotFound(path.to_path_buf()),
        _ => PipelineError::Io(e),
    })?;
    if metadata.len() == 0 {
        return Err(PipelineError::EmptyInput(path.to_path_buf()));
    }

    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Err(PipelineError::EmptyInput(path.to_path_buf()));
    }

    info!("Loaded {} ({} bytes)", path.display(), metadata.len());
    Ok(vec![text])
}
