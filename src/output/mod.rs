//! Output formatting module
//!
//! Renders run summaries and example selections.

mod formatter;

pub use formatter::{OutputFormat, ReportFormatter};
