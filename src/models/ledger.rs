//! Test status ledger
//!
//! Tracks which examples passed, failed or were skipped during a run.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::example::ExampleId;

/// Stage of the per-example procedure
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Fetch,
    Test,
    Analyze,
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::Fetch => "fetch",
            Step::Test => "test",
            Step::Analyze => "analyze",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Final status of one example
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExampleStatus {
    Pass,
    Fail,
    Skip,
}

impl ExampleStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            ExampleStatus::Pass => "✓",
            ExampleStatus::Fail => "✗",
            ExampleStatus::Skip => "○",
        }
    }
}

impl fmt::Display for ExampleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExampleStatus::Pass => write!(f, "PASS"),
            ExampleStatus::Fail => write!(f, "FAIL"),
            ExampleStatus::Skip => write!(f, "SKIP"),
        }
    }
}

/// One passed or failed example
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub example: ExampleId,
    pub duration_ms: u64,
    /// Step that failed, `None` for passed examples
    pub step: Option<Step>,
    pub message: Option<String>,
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.example)?;
        if let Some(step) = self.step {
            write!(f, " ({step})")?;
        }
        Ok(())
    }
}

/// Raised at the end of a run when any example failed
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("{0} example(s) failed")]
    ExamplesFailed(usize),
}

/// Append-only passed/failed/skipped lists for one run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TestLedger {
    passed: Vec<LedgerEntry>,
    failed: Vec<LedgerEntry>,
    skipped: Vec<ExampleId>,
}

impl TestLedger {
    /// Start a ledger; the skipped set is fixed up front
    pub fn new(skipped: Vec<ExampleId>) -> Self {
        Self {
            passed: Vec::new(),
            failed: Vec::new(),
            skipped,
        }
    }

    pub fn record_pass(&mut self, example: ExampleId, duration_ms: u64) {
        self.passed.push(LedgerEntry {
            example,
            duration_ms,
            step: None,
            message: None,
        });
    }

    pub fn record_failure(
        &mut self,
        example: ExampleId,
        duration_ms: u64,
        step: Step,
        message: impl Into<String>,
    ) {
        self.failed.push(LedgerEntry {
            example,
            duration_ms,
            step: Some(step),
            message: Some(message.into()),
        });
    }

    pub fn passed(&self) -> &[LedgerEntry] {
        &self.passed
    }

    pub fn failed(&self) -> &[LedgerEntry] {
        &self.failed
    }

    pub fn skipped(&self) -> &[ExampleId] {
        &self.skipped
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.passed
            .iter()
            .chain(&self.failed)
            .map(|e| e.duration_ms)
            .sum()
    }

    /// Process exit code: the number of failed examples
    pub fn exit_code(&self) -> i32 {
        i32::try_from(self.failed.len()).unwrap_or(i32::MAX)
    }

    pub fn ensure_success(&self) -> Result<(), RunError> {
        if self.failed.is_empty() {
            Ok(())
        } else {
            Err(RunError::ExamplesFailed(self.failed.len()))
        }
    }
}
