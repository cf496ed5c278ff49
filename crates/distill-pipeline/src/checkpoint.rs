//! Append-only checkpoint log
//!
//! The log is a JSON Lines file with one `{"chunk_index": N, "content": {...}}`
//! object per accepted record. It is the only durable state of a run: a chunk
//! counts as done exactly when its append completed, i.e. its lines are
//! readable and newline-terminated.
//!
//! Appends are whole chunks, so an unterminated final line can only belong to
//! the last append. That append is treated as never having happened: its
//! lines are ignored on read and cut off before the next write.

use crate::error::PipelineError;
use crate::types::{CheckpointRecord, ScanReport, ValidatedRecord};
use distill_domain::ChunkIndex;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Serialize)]
struct CheckpointLine<'a> {
    chunk_index: ChunkIndex,
    content: &'a ValidatedRecord,
}

/// Committed contents of the log file
#[derive(Default)]
struct LogContents {
    entries: Vec<CheckpointRecord>,
    skipped: usize,
    /// Byte offset where an unfinished append starts
    torn_from: Option<u64>,
}

/// Durable, append-only record of accepted work
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    tail_repaired: bool,
}

impl CheckpointStore {
    /// Open a store at `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tail_repaired: false,
        }
    }

    /// Location of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a log from an earlier run exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read the log and report which chunks are already done
    ///
    /// Unreadable lines and the lines of an unfinished append are skipped
    /// with a warning. A missing file is an empty scan.
    pub fn scan(&self) -> Result<ScanReport, PipelineError> {
        let log = self.read_log()?;
        let mut report = ScanReport {
            skipped_lines: log.skipped,
            records: log.entries.len(),
            ..ScanReport::default()
        };
        report.processed.extend(log.entries.iter().map(|entry| entry.chunk_index));
        Ok(report)
    }

    /// Durably append the accepted records of one chunk
    ///
    /// All lines are written in one buffer and synced to disk before this
    /// returns. Returns the number of lines written.
    pub fn append(
        &mut self,
        chunk_index: ChunkIndex,
        records: &[ValidatedRecord],
    ) -> Result<usize, PipelineError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut buffer = Vec::new();
        for content in records {
            serde_json::to_writer(&mut buffer, &CheckpointLine { chunk_index, content })?;
            buffer.push(b'\n');
        }

        if !self.tail_repaired {
            self.discard_torn_tail()?;
            self.tail_repaired = true;
        }
        self.write_durably(&buffer)
            .map_err(|source| self.io_error(source))?;
        debug!("Appended {} records for chunk {}", records.len(), chunk_index);
        Ok(records.len())
    }

    /// Read every stored record ordered by chunk index
    ///
    /// The sort is stable, so records of one chunk keep their emission order.
    pub fn consolidate(&self) -> Result<Vec<ValidatedRecord>, PipelineError> {
        let mut entries = self.read_log()?.entries;
        entries.sort_by_key(|entry| entry.chunk_index);
        Ok(entries.into_iter().map(|entry| entry.content).collect())
    }

    /// Delete the log. A missing file is not an error.
    pub fn clear(&mut self) -> Result<(), PipelineError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => return Err(self.io_error(source)),
        }
        self.tail_repaired = false;
        Ok(())
    }

    fn write_durably(&self, buffer: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;
        file.write_all(buffer)?;
        file.flush()?;
        file.sync_data()
    }

    fn discard_torn_tail(&self) -> Result<(), PipelineError> {
        let Some(cut) = self.read_log()?.torn_from else {
            return Ok(());
        };
        warn!(
            "Truncating checkpoint {} to {} bytes to drop an unfinished append",
            self.path.display(),
            cut
        );
        let truncate = || -> io::Result<()> {
            let file = OpenOptions::new().write(true).open(&self.path)?;
            file.set_len(cut)?;
            file.sync_data()
        };
        truncate().map_err(|source| self.io_error(source))
    }

    fn read_log(&self) -> Result<LogContents, PipelineError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(parse_log(&bytes, &self.path)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(LogContents::default()),
            Err(source) => Err(self.io_error(source)),
        }
    }

    fn io_error(&self, source: io::Error) -> PipelineError {
        PipelineError::Checkpoint {
            path: self.path.clone(),
            source,
        }
    }
}

fn parse_log(bytes: &[u8], path: &Path) -> LogContents {
    let mut lines: Vec<(usize, CheckpointRecord)> = Vec::new();
    let mut skipped = 0;
    let mut offset = 0;
    let mut torn = None;

    // Split on raw bytes: a torn write may end inside a UTF-8 sequence
    for (line_no, segment) in bytes.split_inclusive(|byte| *byte == b'\n').enumerate() {
        let start = offset;
        offset += segment.len();
        let Some(line) = segment.strip_suffix(b"\n") else {
            torn = Some((start, segment));
            break;
        };
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        match serde_json::from_slice::<CheckpointRecord>(line) {
            Ok(entry) => lines.push((start, entry)),
            Err(e) => {
                warn!(
                    "Skipping malformed checkpoint line {} in {}: {}",
                    line_no + 1,
                    path.display(),
                    e
                );
                skipped += 1;
            }
        }
    }

    let mut torn_from = None;
    if let Some((start, fragment)) = torn {
        let mut cut = start;
        if !fragment.iter().all(u8::is_ascii_whitespace) {
            skipped += 1;
            // Without a readable index, the last committed chunk is suspect
            let suspect = leading_chunk_index(fragment)
                .or_else(|| lines.last().map(|(_, entry)| entry.chunk_index));
            while let Some((line_start, entry)) = lines.last() {
                if Some(entry.chunk_index) != suspect {
                    break;
                }
                cut = *line_start;
                lines.pop();
                skipped += 1;
            }
            warn!(
                "Checkpoint {} ends inside an unfinished append (chunk {:?}); ignoring it",
                path.display(),
                suspect
            );
        }
        torn_from = Some(cut as u64);
    }

    LogContents {
        entries: lines.into_iter().map(|(_, entry)| entry).collect(),
        skipped,
        torn_from,
    }
}

// `chunk_index` is serialized first, so even a torn line names its chunk
fn leading_chunk_index(fragment: &[u8]) -> Option<ChunkIndex> {
    let rest = skip_whitespace(fragment.strip_prefix(b"{")?);
    let rest = skip_whitespace(rest.strip_prefix(br#""chunk_index""#)?);
    let rest = skip_whitespace(rest.strip_prefix(b":")?);
    let digits = rest.iter().take_while(|byte| byte.is_ascii_digit()).count();

    // The number is only trustworthy once something follows it
    match skip_whitespace(&rest[digits..]).first().copied() {
        Some(b',') | Some(b'}') if digits > 0 => {
            std::str::from_utf8(&rest[..digits]).ok()?.parse().ok()
        }
        _ => None,
    }
}

fn skip_whitespace(bytes: &[u8]) -> &[u8] {
    let leading = bytes.iter().take_while(|byte| byte.is_ascii_whitespace()).count();
    &bytes[leading..]
}
