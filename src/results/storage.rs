//! Run record persistence
//!
//! Saves the outcome of a run as JSON or CSV for CI artifacts.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use crate::models::{ExampleId, ExampleStatus, SelectionFilters, Step, TestLedger};

/// Export format, chosen from the file extension
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }
}

/// One example in a stored run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub example: ExampleId,
    pub status: ExampleStatus,
    pub step: Option<Step>,
    pub message: Option<String>,
    pub duration_ms: u64,
}

/// Stored outcome of a whole run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub examples_root: String,
    pub filter: String,
    pub skip: String,
    pub exit_code: i32,
    pub entries: Vec<RecordEntry>,
}

impl RunRecord {
    pub fn new(
        started_at: DateTime<Utc>,
        examples_root: &Path,
        filters: &SelectionFilters,
        ledger: &TestLedger,
    ) -> Self {
        let ran = ledger
            .passed()
            .iter()
            .map(|e| (ExampleStatus::Pass, e))
            .chain(ledger.failed().iter().map(|e| (ExampleStatus::Fail, e)))
            .map(|(status, e)| RecordEntry {
                example: e.example.clone(),
                status,
                step: e.step,
                message: e.message.clone(),
                duration_ms: e.duration_ms,
            });

        let skipped = ledger.skipped().iter().map(|id| RecordEntry {
            example: id.clone(),
            status: ExampleStatus::Skip,
            step: None,
            message: None,
            duration_ms: 0,
        });

        let mut entries: Vec<RecordEntry> = ran.chain(skipped).collect();
        entries.sort_by(|a, b| a.example.cmp(&b.example));

        Self {
            started_at,
            completed_at: Utc::now(),
            examples_root: examples_root.display().to_string(),
            filter: filters.choose.to_string(),
            skip: filters.skip.to_string(),
            exit_code: ledger.exit_code(),
            entries,
        }
    }

    /// Save to `path`, CSV for `.csv` files and pretty JSON otherwise
    pub fn save(&self, path: &Path) -> Result<()> {
        match ExportFormat::from_path(path) {
            ExportFormat::Json => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                serde_json::to_writer_pretty(BufWriter::new(file), self)
                    .context("Failed to write run record")?;
            }
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;

                writer.write_record(["example", "status", "step", "duration_ms", "message"])?;
                for entry in &self.entries {
                    writer.write_record([
                        entry.example.to_string(),
                        entry.status.to_string(),
                        entry.step.map(|s| s.to_string()).unwrap_or_default(),
                        entry.duration_ms.to_string(),
                        entry.message.clone().unwrap_or_default(),
                    ])?;
                }
                writer.flush()?;
            }
        }

        info!("Run record saved to {}", path.display());
        Ok(())
    }

}
