//! Sliding-window chunking of the source document

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use distill_domain::Chunk;

/// Splits text into overlapping windows of at most `size` characters
///
/// Each window after the first starts `size - overlap` characters after the
/// previous one, and the last window is the first that reaches the end of
/// the text. Boundaries depend only on the text and the two parameters,
/// which is what makes resuming by chunk index sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    /// Create a new chunker
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] unless `0 <= overlap < size`.
    pub fn new(size: usize, overlap: usize) -> Result<Self, PipelineError> {
        if size == 0 {
            return Err(PipelineError::Config("chunk size must be greater than 0".to_string()));
        }
        if overlap >= size {
            return Err(PipelineError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                overlap, size
            )));
        }
        Ok(Self { size, overlap })
    }

    /// Create a chunker from the pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Distance in characters between consecutive window starts
    pub fn stride(&self) -> usize {
        self.size - self.overlap
    }

    /// Split one text into windows
    pub fn windows<'a>(&self, text: &'a str) -> Vec<&'a str> {
        // Byte offset of every char boundary, including the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(offset, _)| offset)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = bounds.len() - 1;

        let mut windows = Vec::new();
        let mut start = 0;
        while start < char_count {
            let end = usize::min(start + self.size, char_count);
            windows.push(&text[bounds[start]..bounds[end]]);
            if end == char_count {
                break;
            }
            start += self.stride();
        }
        windows
    }

    /// Chunk an ordered sequence of document blocks
    ///
    /// Blocks are windowed independently; indices run contiguously across
    /// blocks in block order. Empty blocks contribute nothing.
    pub fn chunk_blocks<S: AsRef<str>>(&self, blocks: &[S]) -> Vec<Chunk> {
        blocks
            .iter()
            .flat_map(|block| self.windows(block.as_ref()))
            .enumerate()
            .map(|(index, text)| Chunk::new(index, text))
            .collect()
    }

    /// Chunk a single document
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        self.chunk_blocks(&[text])
    }
}
