//! Data models for example testing
//!
//! Catalog, selection filters and the run ledger.

mod example;
mod filter;
mod ledger;

pub use example::{Catalog, ExampleId, HTML_EXAMPLE};
pub use filter::{Selection, SelectionFilters};
pub use ledger::{ExampleStatus, LedgerEntry, Step, TestLedger};
