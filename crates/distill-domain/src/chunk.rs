//! Chunk module - the unit of work submitted to the extraction service

use std::fmt;

/// Position of a chunk in document order (0-based, contiguous)
///
/// The index is the only identity used for resume and deduplication; chunk
/// text is never compared or hashed.
pub type ChunkIndex = usize;

/// A bounded, indexed window of the source document
///
/// Chunks are produced once per run and never mutated afterwards.
///
/// # Examples
///
/// ```
/// use distill_domain::Chunk;
///
/// let chunk = Chunk::new(0, "Nodes are the building blocks of a workflow.");
/// assert_eq!(chunk.index(), 0);
/// assert_eq!(chunk.char_len(), 44);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    index: ChunkIndex,
    text: String,
}

impl Chunk {
    /// Create a chunk at the given index
    pub fn new(index: ChunkIndex, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }

    /// Index of this chunk in document order
    pub fn index(&self) -> ChunkIndex {
        self.index
    }

    /// Text content of the chunk
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters (Unicode scalar values)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk #{} ({} chars)", self.index, self.char_len())
    }
}
