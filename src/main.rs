//! Example Tester - per-example integration test orchestrator
//!
//! Runs the tests of every example project in a documentation repository,
//! one example at a time, and reports which examples passed, failed or were
//! skipped. The process exit code is the number of failed examples.
//!
//! ## Usage
//!
//! ```bash
//! # Test every example
//! example-tester test
//!
//! # Only the tour of heroes examples, without the last step
//! example-tester test --filter=toh --skip=toh-6
//!
//! # Show what would be tested
//! example-tester list --skip=acx
//!
//! # Write a default configuration file
//! example-tester config init
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

mod cli;
mod config;
mod executor;
mod models;
mod output;
mod results;
mod utils;

use cli::{Args, SelectArgs};
use config::{AppConfig, EnvConfig};
use executor::{CommandPlan, ExampleRunner, ShellExecutor};
use models::{Catalog, SelectionFilters, TestLedger};
use output::{OutputFormat, ReportFormatter};
use results::RunRecord;
use utils::{init_logger, LogLevel};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(LogLevel::from_verbose(
        args.verbose || env.verbose.unwrap_or(false),
    ));

    match args.command {
        cli::Command::Test(test_args) => {
            let ledger = run_tests(test_args, args.config, &env).await?;
            if let Err(e) = ledger.ensure_success() {
                error!("{}", e);
                std::process::exit(ledger.exit_code().min(255));
            }
        }
        cli::Command::List(select_args) => {
            list_examples(select_args, &env)?;
        }
        cli::Command::Config(config_args) => {
            manage_config(config_args, args.config, &env)?;
        }
    }

    Ok(())
}

async fn run_tests(
    args: cli::TestArgs,
    config_path: Option<PathBuf>,
    env: &EnvConfig,
) -> Result<TestLedger> {
    let config = resolve_config(&args, config_path, env)?;
    let filters = resolve_filters(&args.select, env)?;
    let formatter = ReportFormatter::new(resolve_format(&args.select, env)?);
    let plan = CommandPlan::from_config(&config)?;

    info!(
        "Testing examples in {} (filter: {}, skip: {})",
        config.examples_root.display(),
        filters.choose,
        filters.skip
    );

    let started_at = Utc::now();
    let selection = filters.select(&Catalog::build());
    let runner = ExampleRunner::new(ShellExecutor::new(), plan, selection);
    let ledger = runner.run_all().await;

    report_summary(&mut std::io::stdout().lock(), &formatter, &ledger)?;

    if let Some(path) = &args.output {
        RunRecord::new(started_at, &config.examples_root, &filters, &ledger)
            .save(path)
            .with_context(|| format!("Failed to save run record to {}", path.display()))?;
    }

    Ok(ledger)
}

/// Config file, then environment, then CLI flags, validated once
fn resolve_config(
    args: &cli::TestArgs,
    config_path: Option<PathBuf>,
    env: &EnvConfig,
) -> Result<AppConfig> {
    let mut config = load_config(config_path, env)?;
    if let Some(root) = &args.root {
        config.examples_root = root.clone();
    }
    if let Some(pub_command) = &args.pub_command {
        config.pub_command = pub_command.clone();
    }
    if let Some(web_compiler) = &args.web_compiler {
        config.web_compiler = Some(web_compiler.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Write the Passed / Skipped / Failed blocks
///
/// JSON goes to `out` untouched; the other formats are logged block by block.
fn report_summary(
    out: &mut impl Write,
    formatter: &ReportFormatter,
    ledger: &TestLedger,
) -> Result<()> {
    let report = formatter.format_ledger(ledger);
    match formatter.format() {
        OutputFormat::Json => writeln!(out, "{report}").context("Failed to write summary")?,
        _ => {
            for block in report.split("\n\n").filter(|b| !b.is_empty()) {
                info!("{}\n", block);
            }
        }
    }
    Ok(())
}

fn list_examples(args: SelectArgs, env: &EnvConfig) -> Result<()> {
    let filters = resolve_filters(&args, env)?;
    let formatter = ReportFormatter::new(resolve_format(&args, env)?);

    let selection = filters.select(&Catalog::build());
    print!("{}", formatter.format_selection(&selection));

    Ok(())
}

fn manage_config(args: cli::ConfigArgs, config_path: Option<PathBuf>, env: &EnvConfig) -> Result<()> {
    match args.action {
        cli::ConfigAction::Show => {
            let config = load_config(config_path, env)?;
            config.validate()?;
            print!(
                "{}",
                serde_yaml::to_string(&config).context("Failed to serialize config")?
            );
        }
        cli::ConfigAction::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            AppConfig::default().save(&path)?;
            println!("✓ Wrote default configuration to {}", path.display());
        }
        cli::ConfigAction::Env => {
            config::print_env_help();
            if env.has_any() {
                println!();
                env.print_summary();
            }
        }
    }

    Ok(())
}

/// Config file from the CLI, the environment, or the standard locations,
/// with environment overrides applied but not yet validated
fn load_config(config_path: Option<PathBuf>, env: &EnvConfig) -> Result<AppConfig> {
    let path = config_path.or_else(|| env.config_file.as_ref().map(PathBuf::from));
    Ok(AppConfig::load_or_default(path.as_deref())?.merge_env(env))
}

/// CLI patterns win over environment patterns
fn resolve_filters(args: &SelectArgs, env: &EnvConfig) -> Result<SelectionFilters> {
    let choose = args.filter.as_deref().or(env.filter.as_deref());
    let skip = args.skip.as_deref().or(env.skip.as_deref());
    SelectionFilters::from_patterns(choose, skip).context("Invalid --filter or --skip pattern")
}

fn resolve_format(args: &SelectArgs, env: &EnvConfig) -> Result<OutputFormat> {
    match args.format.as_deref().or(env.format.as_deref()) {
        Some(format) => OutputFormat::from_str(format)
            .ok_or_else(|| anyhow::anyhow!("Unknown output format: {format}")),
        None => Ok(OutputFormat::Text),
    }
}
