//! Final dataset consolidation

use crate::checkpoint::CheckpointStore;
use crate::error::PipelineError;
use crate::types::ConsolidationReport;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Compact the checkpoint into the final dataset and delete the checkpoint
///
/// Only call this after a run returned [`crate::RunOutcome::Completed`].
/// Records are written one JSON object per line into a temporary sibling
/// file, synced, and renamed over `output_path`; the checkpoint is cleared
/// only after the rename succeeded.
pub fn consolidate(
    store: &mut CheckpointStore,
    output_path: &Path,
) -> Result<ConsolidationReport, PipelineError> {
    let records = store.consolidate()?;
    let staging = staging_path(output_path);

    write_lines(&staging, &records).map_err(|source| output_error(&staging, source))?;
    fs::rename(&staging, output_path).map_err(|source| output_error(output_path, source))?;

    store.clear()?;

    info!(
        "Wrote {} records to {}; removed checkpoint {}",
        records.len(),
        output_path.display(),
        store.path().display()
    );

    Ok(ConsolidationReport {
        output_path: output_path.to_path_buf(),
        records_written: records.len(),
    })
}

fn write_lines<T: serde::Serialize>(path: &Path, records: &[T]) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

fn staging_path(output_path: &Path) -> PathBuf {
    let mut name = OsString::from(output_path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn output_error(path: &Path, source: io::Error) -> PipelineError {
    PipelineError::Output {
        path: path.to_path_buf(),
        source,
    }
}
