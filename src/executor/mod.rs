//! Example execution engine
//!
//! Builds external commands per example and runs them sequentially.

mod process;
mod runner;
mod strategy;

pub use process::ShellExecutor;
pub use runner::ExampleRunner;
pub use strategy::{CommandPlan, DEFAULT_EXAMPLES_ROOT};
