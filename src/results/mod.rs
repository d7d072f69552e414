//! Run results module
//!
//! Persists run records for later inspection.

mod storage;

pub use storage::RunRecord;
