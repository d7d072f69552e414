//! Output formatters for run summaries
//!
//! Provides text, JSON and summary formats. The summary format is the text
//! blocks followed by a one-line count.

use serde::Serialize;

use crate::models::{ExampleId, ExampleStatus, LedgerEntry, Selection, TestLedger};
use crate::utils::format_duration;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Run summary formatter
pub struct ReportFormatter {
    format: OutputFormat,
}

#[derive(Serialize)]
struct LedgerJson<'a> {
    passed: &'a [LedgerEntry],
    skipped: &'a [ExampleId],
    failed: &'a [LedgerEntry],
    exit_code: i32,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the end-of-run summary
    pub fn format_ledger(&self, ledger: &TestLedger) -> String {
        match self.format {
            OutputFormat::Text => Self::format_blocks(ledger),
            OutputFormat::Json => {
                let json = LedgerJson {
                    passed: ledger.passed(),
                    skipped: ledger.skipped(),
                    failed: ledger.failed(),
                    exit_code: ledger.exit_code(),
                };
                serde_json::to_string_pretty(&json).unwrap_or_default()
            }
            OutputFormat::Summary => {
                format!("{}{}\n", Self::format_blocks(ledger), Self::format_brief(ledger))
            }
        }
    }

    /// Passed, Skipped and Failed blocks, one example per line
    fn format_blocks(ledger: &TestLedger) -> String {
        let passed: Vec<String> = ledger.passed().iter().map(|e| e.to_string()).collect();
        let skipped: Vec<String> = ledger.skipped().iter().map(|id| id.to_string()).collect();
        let failed: Vec<String> = ledger.failed().iter().map(|e| e.to_string()).collect();

        let mut output = String::new();
        output.push_str(&block("Passed", &passed));
        output.push_str(&block("Skipped", &skipped));
        output.push_str(&block("Failed", &failed));
        output
    }

    fn format_brief(ledger: &TestLedger) -> String {
        format!(
            "{} {} passed | {} {} failed | {} {} skipped | {}",
            ExampleStatus::Pass.symbol(),
            ledger.passed().len(),
            ExampleStatus::Fail.symbol(),
            ledger.failed().len(),
            ExampleStatus::Skip.symbol(),
            ledger.skipped().len(),
            format_duration(ledger.total_duration_ms())
        )
    }

    /// Format the work list and skipped set of a selection
    pub fn format_selection(&self, selection: &Selection) -> String {
        match self.format {
            OutputFormat::Json => {
                #[derive(Serialize)]
                struct SelectionJson<'a> {
                    tests: &'a [ExampleId],
                    skipped: &'a [ExampleId],
                }

                serde_json::to_string_pretty(&SelectionJson {
                    tests: &selection.work_list,
                    skipped: &selection.skipped,
                })
                .unwrap_or_default()
            }
            _ => {
                let tests: Vec<String> = selection.work_list.iter().map(|id| id.to_string()).collect();
                let skipped: Vec<String> = selection.skipped.iter().map(|id| id.to_string()).collect();
                format!("{}{}", block("Tests", &tests), block("Skipped", &skipped))
            }
        }
    }
}

/// `Label:` followed by indented items and a blank line
fn block(label: &str, items: &[String]) -> String {
    let mut output = format!("{label}:\n");
    for item in items {
        output.push_str("  ");
        output.push_str(item);
        output.push('\n');
    }
    output.push('\n');
    output
}
