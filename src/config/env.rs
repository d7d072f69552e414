//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "EXAMPLE_TESTER";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Examples root from EXAMPLE_TESTER_ROOT
    pub examples_root: Option<String>,
    /// Choose filter from EXAMPLE_TESTER_FILTER
    pub filter: Option<String>,
    /// Skip filter from EXAMPLE_TESTER_SKIP
    pub skip: Option<String>,
    /// Pub command from EXAMPLE_TESTER_PUB_COMMAND
    pub pub_command: Option<String>,
    /// Web compiler from EXAMPLE_TESTER_WEB_COMPILER
    pub web_compiler: Option<String>,
    /// Config file from EXAMPLE_TESTER_CONFIG
    pub config_file: Option<String>,
    /// Output format from EXAMPLE_TESTER_FORMAT
    pub format: Option<String>,
    /// Verbose from EXAMPLE_TESTER_VERBOSE
    pub verbose: Option<bool>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            examples_root: get_env("ROOT"),
            filter: get_env("FILTER"),
            skip: get_env("SKIP"),
            pub_command: get_env("PUB_COMMAND"),
            web_compiler: get_env("WEB_COMPILER"),
            config_file: get_env("CONFIG"),
            format: get_env("FORMAT"),
            verbose: get_env_bool("VERBOSE"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.examples_root.is_some()
            || self.filter.is_some()
            || self.skip.is_some()
            || self.pub_command.is_some()
            || self.web_compiler.is_some()
            || self.config_file.is_some()
            || self.format.is_some()
            || self.verbose.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_ROOT:         {:?}", ENV_PREFIX, self.examples_root);
        println!("  {}_FILTER:       {:?}", ENV_PREFIX, self.filter);
        println!("  {}_SKIP:         {:?}", ENV_PREFIX, self.skip);
        println!("  {}_PUB_COMMAND:  {:?}", ENV_PREFIX, self.pub_command);
        println!("  {}_WEB_COMPILER: {:?}", ENV_PREFIX, self.web_compiler);
        println!("  {}_CONFIG:       {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_FORMAT:       {:?}", ENV_PREFIX, self.format);
        println!("  {}_VERBOSE:      {:?}", ENV_PREFIX, self.verbose);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Print all EXAMPLE_TESTER environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_ROOT          Directory containing the examples");
    println!("  {ENV_PREFIX}_FILTER        Only test examples matching this regex");
    println!("  {ENV_PREFIX}_SKIP          Skip examples matching this regex");
    println!("  {ENV_PREFIX}_PUB_COMMAND   Dependency fetch command (get, upgrade)");
    println!("  {ENV_PREFIX}_WEB_COMPILER  build_runner web compiler (dartdevc, dart2js)");
    println!("  {ENV_PREFIX}_CONFIG        Path to configuration file");
    println!("  {ENV_PREFIX}_FORMAT        Summary format (text, json, summary)");
    println!("  {ENV_PREFIX}_VERBOSE       Log command output (true/false)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_SKIP='acx'");
    println!("  example-tester test --filter=toh");
}
