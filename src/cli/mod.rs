//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Per-example integration test orchestrator
#[derive(Parser, Debug)]
#[command(name = "example-tester")]
#[command(author = "hephaex@gmail.com")]
#[command(version = "0.1.4")]
#[command(about = "Run the integration tests of every documentation example")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Log captured command output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch, test and analyze the selected examples
    Test(TestArgs),

    /// List the examples a test run would cover
    List(SelectArgs),

    /// Show or create configuration
    Config(ConfigArgs),
}

/// Example selection shared by `test` and `list`
#[derive(Parser, Debug, Default)]
pub struct SelectArgs {
    /// Only test examples matching this regex
    #[arg(long)]
    pub filter: Option<String>,

    /// Skip examples matching this regex
    #[arg(long)]
    pub skip: Option<String>,

    /// Output format (text, json, summary)
    #[arg(short, long)]
    pub format: Option<String>,
}

/// Arguments for test command
#[derive(Parser, Debug, Default)]
pub struct TestArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Directory containing the examples
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Dependency fetch command (get, upgrade)
    #[arg(long)]
    pub pub_command: Option<String>,

    /// Web compiler for build_runner tests (dartdevc, dart2js)
    #[arg(long)]
    pub web_compiler: Option<String>,

    /// Save the run record to a .json or .csv file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Destination file
        #[arg(short, long, default_value = "example-tester.yaml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// List supported environment variables
    Env,
}
