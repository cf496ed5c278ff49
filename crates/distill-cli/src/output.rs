//! Output formatting for the CLI.

use colored::*;
use distill_pipeline::{ConsolidationReport, RunOutcome, RunReport, ScanReport};
use std::path::Path;

/// Output formatter.
pub struct Formatter {
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(color_enabled: bool) -> Self {
        Self { color_enabled }
    }

    /// Summarize a finished or interrupted run.
    pub fn run_summary(&self, report: &RunReport) -> String {
        let status = match report.outcome {
            RunOutcome::Completed => self.colorize("completed", "green"),
            RunOutcome::Interrupted => self.colorize("interrupted", "yellow"),
        };
        format!(
            "Run {} {} after {:.1}s\n  chunks:   {}/{} visited ({} resumed, {} accepted, {} rejected, {} failed)\n  records:  {} appended",
            report.run_id,
            status,
            report.elapsed_ms as f64 / 1000.0,
            report.chunks_visited(),
            report.total_chunks,
            report.skipped,
            report.accepted,
            report.rejected,
            report.failed,
            report.records_appended,
        )
    }

    /// Report the written dataset.
    pub fn dataset_written(&self, report: &ConsolidationReport) -> String {
        self.success(&format!(
            "Wrote {} record(s) to {}",
            report.records_written,
            report.output_path.display()
        ))
    }

    /// Report a run left resumable.
    pub fn run_interrupted(&self, records: usize, checkpoint: &Path) -> String {
        self.warning(&format!(
            "Interrupted: {} record(s) saved in {}. Run again to resume.",
            records,
            checkpoint.display()
        ))
    }

    /// Describe the checkpoint contents.
    pub fn checkpoint_status(&self, scan: &ScanReport, checkpoint: &Path) -> String {
        let mut lines = vec![
            self.info(&format!("Checkpoint {}", checkpoint.display())),
            format!("  processed chunks: {}", scan.processed.len()),
            format!("  stored records:   {}", scan.records),
        ];
        if let Some(last) = scan.processed.last() {
            lines.push(format!("  highest chunk:    {}", last));
        }
        if scan.skipped_lines > 0 {
            lines.push(self.warning(&format!("{} corrupt line(s) skipped", scan.skipped_lines)));
        }
        lines.join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
