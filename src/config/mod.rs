//! Configuration module
//!
//! Handles finding, loading and validating configuration files.

mod env;

pub use env::{print_env_help, EnvConfig};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::executor::DEFAULT_EXAMPLES_ROOT;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./example-tester.yaml",
    "./example-tester.yml",
    "./.example-tester.yaml",
    "~/.config/example-tester/config.yaml",
];

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory containing the example projects
    pub examples_root: PathBuf,

    /// `pub` subcommand used to fetch dependencies (get or upgrade)
    pub pub_command: String,

    /// Web compiler passed to build_runner (e.g. dartdevc, dart2js)
    pub web_compiler: Option<String>,

    /// Output that marks a successful test run
    pub success_pattern: String,

    /// External command templates
    pub commands: CommandConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            examples_root: PathBuf::from(DEFAULT_EXAMPLES_ROOT),
            pub_command: "get".to_string(),
            web_compiler: None,
            success_pattern: "All tests passed".to_string(),
            commands: CommandConfig::default(),
        }
    }
}

/// External commands run for each example
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    /// Browser tests of the plain HTML example
    pub html_test: String,

    /// Build of the component codelab examples
    pub build_only: String,

    /// build_runner test invocation, before compiler options
    pub angular_test: String,

    /// Test runner arguments passed after `--`
    pub angular_test_args: String,

    /// Static analysis, warnings are fatal
    pub analyze: String,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            html_test: "pub run test -p travischrome --tags browser".to_string(),
            build_only: "webdev build --no-release".to_string(),
            angular_test: "pub run build_runner test --delete-conflicting-outputs".to_string(),
            angular_test_args: "-p chrome".to_string(),
            analyze: "dartanalyzer --preview-dart-2 --fatal-warnings .".to_string(),
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load from an explicit path, else the first standard location, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match Self::find() {
                Some(path) => Self::load(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from file
    ///
    /// Values are checked by [`AppConfig::validate`] once every override has
    /// been applied.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !["get", "upgrade"].contains(&self.pub_command.as_str()) {
            anyhow::bail!(
                "Unsupported pub command '{}'. Expected 'get' or 'upgrade'",
                self.pub_command
            );
        }

        let commands = [
            ("html_test", &self.commands.html_test),
            ("build_only", &self.commands.build_only),
            ("angular_test", &self.commands.angular_test),
            ("analyze", &self.commands.analyze),
        ];
        for (name, command) in commands {
            if command.trim().is_empty() {
                anyhow::bail!("Command '{}' must not be empty", name);
            }
        }

        regex::Regex::new(&self.success_pattern)
            .with_context(|| format!("Invalid success pattern: {}", self.success_pattern))?;

        Ok(())
    }

    /// Apply environment overrides
    pub fn merge_env(mut self, env: &EnvConfig) -> Self {
        if let Some(root) = &env.examples_root {
            self.examples_root = PathBuf::from(root);
        }
        if let Some(pub_command) = &env.pub_command {
            self.pub_command = pub_command.clone();
        }
        if let Some(web_compiler) = &env.web_compiler {
            self.web_compiler = Some(web_compiler.clone());
        }
        self
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
