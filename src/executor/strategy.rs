//! Per-example test strategies
//!
//! Chooses the external test command for an example and builds the
//! command requests for each step.

use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

use super::process::{ExecRequest, SeverityPattern};
use crate::config::AppConfig;
use crate::models::HTML_EXAMPLE;

/// Examples root used when none is configured
pub const DEFAULT_EXAMPLES_ROOT: &str = "examples";

/// Category whose examples are only built, not tested
const BUILD_ONLY_CATEGORY: &str = "acx";

/// How an example's tests are run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestStrategy {
    /// Browser-tagged `pub run test`
    Html,
    /// `webdev build`, exit code only
    BuildOnly,
    /// `build_runner test` against Chrome
    Angular,
}

impl TestStrategy {
    /// Classify an example directory below `root`
    pub fn classify_in(root: &Path, path: &Path) -> Self {
        if path == root.join(HTML_EXAMPLE) {
            TestStrategy::Html
        } else if path.starts_with(root.join(BUILD_ONLY_CATEGORY)) {
            TestStrategy::BuildOnly
        } else {
            TestStrategy::Angular
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TestStrategy::Html => "html",
            TestStrategy::BuildOnly => "build-only",
            TestStrategy::Angular => "angular",
        }
    }

    /// Whether the test output must report success
    pub fn requires_success_output(&self) -> bool {
        !matches!(self, TestStrategy::BuildOnly)
    }
}

impl fmt::Display for TestStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete commands for the fetch, test and analyze steps
#[derive(Clone, Debug)]
pub struct CommandPlan {
    root: PathBuf,
    fetch: String,
    html_test: String,
    build_only: String,
    angular_test: String,
    analyze: String,
    success: Regex,
    severity: SeverityPattern,
}

impl CommandPlan {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let commands = &config.commands;

        let mut angular_test = vec![commands.angular_test.clone()];
        if let Some(compiler) = &config.web_compiler {
            angular_test.push(web_compiler_options(compiler));
        }
        angular_test.push("--".to_string());
        angular_test.push(commands.angular_test_args.clone());

        Ok(Self {
            root: config.examples_root.clone(),
            fetch: format!("pub {}", config.pub_command),
            html_test: commands.html_test.clone(),
            build_only: commands.build_only.clone(),
            angular_test: angular_test.join(" ").trim_end().to_string(),
            analyze: commands.analyze.clone(),
            success: Regex::new(&config.success_pattern)
                .with_context(|| format!("Invalid success pattern: {}", config.success_pattern))?,
            severity: SeverityPattern::new().context("Failed to compile severity pattern")?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn strategy_for(&self, dir: &Path) -> TestStrategy {
        TestStrategy::classify_in(&self.root, dir)
    }

    /// Dependency fetch, judged by exit code
    pub fn fetch(&self, dir: &Path) -> ExecRequest {
        ExecRequest::new(&self.fetch, dir)
    }

    /// Test step for the given strategy
    pub fn test(&self, strategy: TestStrategy, dir: &Path) -> ExecRequest {
        let command = match strategy {
            TestStrategy::Html => &self.html_test,
            TestStrategy::BuildOnly => &self.build_only,
            TestStrategy::Angular => &self.angular_test,
        };

        let success = strategy
            .requires_success_output()
            .then(|| self.success.clone());

        ExecRequest::new(command, dir)
            .succeed_on(success)
            .fail_on(Some(self.severity.clone()))
    }

    /// Static analysis, judged by exit code
    pub fn analyze(&self, dir: &Path) -> ExecRequest {
        ExecRequest::new(&self.analyze, dir)
    }
}

/// build_runner define selecting the web compiler
fn web_compiler_options(compiler: &str) -> String {
    format!("--define='build_web_compilers|entrypoint=compiler={compiler}'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> CommandPlan {
        CommandPlan::from_config(&AppConfig::default()).unwrap()
    }

    fn classify(path: &str) -> TestStrategy {
        TestStrategy::classify_in(Path::new(DEFAULT_EXAMPLES_ROOT), Path::new(path))
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("examples/html"), TestStrategy::Html);
        assert_eq!(classify("examples/acx/lottery/1-base"), TestStrategy::BuildOnly);
        assert_eq!(classify("examples/ng/doc/toh-1"), TestStrategy::Angular);
    }

    #[test]
    fn test_classify_custom_root() {
        let root = Path::new("site/examples");
        assert_eq!(
            TestStrategy::classify_in(root, Path::new("site/examples/html")),
            TestStrategy::Html
        );
        assert_eq!(
            TestStrategy::classify_in(root, Path::new("site/examples/acx/lottery/4-final")),
            TestStrategy::BuildOnly
        );
        assert_eq!(
            TestStrategy::classify_in(root, Path::new("examples/html")),
            TestStrategy::Angular
        );
    }

    #[test]
    fn test_fetch_and_analyze_commands() {
        let plan = plan();
        let dir = Path::new("examples/ng/doc/toh-1");

        let fetch = plan.fetch(dir);
        assert_eq!(fetch.command, "pub get");
        assert_eq!(fetch.cwd, dir);
        assert!(fetch.success_pattern.is_none());
        assert!(fetch.failure_pattern.is_none());

        let analyze = plan.analyze(dir);
        assert_eq!(analyze.command, "dartanalyzer --preview-dart-2 --fatal-warnings .");
    }

    #[test]
    fn test_test_commands() {
        let plan = plan();

        let html = plan.test(TestStrategy::Html, Path::new("examples/html"));
        assert_eq!(html.command, "pub run test -p travischrome --tags browser");
        assert!(html.success_pattern.is_some());
        assert!(html.failure_pattern.is_some());

        let build = plan.test(TestStrategy::BuildOnly, Path::new("examples/acx/lottery/1-base"));
        assert_eq!(build.command, "webdev build --no-release");
        assert!(build.success_pattern.is_none());
        assert!(build.failure_pattern.is_some());

        let angular = plan.test(TestStrategy::Angular, Path::new("examples/ng/doc/toh-1"));
        assert_eq!(
            angular.command,
            "pub run build_runner test --delete-conflicting-outputs -- -p chrome"
        );
        assert!(angular.success_pattern.is_some());
    }

    #[test]
    fn test_web_compiler_and_upgrade() {
        let config = AppConfig {
            pub_command: "upgrade".to_string(),
            web_compiler: Some("dart2js".to_string()),
            ..Default::default()
        };
        let plan = CommandPlan::from_config(&config).unwrap();

        assert_eq!(plan.fetch(Path::new(".")).command, "pub upgrade");
        assert_eq!(
            plan.test(TestStrategy::Angular, Path::new(".")).command,
            "pub run build_runner test --delete-conflicting-outputs \
             --define='build_web_compilers|entrypoint=compiler=dart2js' -- -p chrome"
        );
    }

    #[test]
    fn test_strategy_for_uses_root() {
        let plan = plan();
        assert_eq!(
            plan.strategy_for(Path::new("examples/acx/lottery/2-starteasy")),
            TestStrategy::BuildOnly
        );
    }
}
