//! Example test runner
//!
//! Runs the fetch, test and analyze steps for every selected example, one
//! example at a time, and records the outcome in the ledger.

use thiserror::Error;
use tracing::{error, info};

use super::process::{ExecError, ExecRequest, ProcessExecutor};
use super::strategy::CommandPlan;
use crate::models::{ExampleId, Selection, Step, TestLedger};
use crate::utils::Timer;

/// Why an example failed
#[derive(Debug, Error)]
#[error("{step} step failed: {error}")]
pub struct StepFailure {
    pub step: Step,
    #[source]
    pub error: ExecError,
}

/// Sequential runner over the work list
pub struct ExampleRunner<E> {
    executor: E,
    plan: CommandPlan,
    work_list: Vec<ExampleId>,
    ledger: TestLedger,
}

impl<E: ProcessExecutor> ExampleRunner<E> {
    pub fn new(executor: E, plan: CommandPlan, selection: Selection) -> Self {
        Self {
            executor,
            plan,
            work_list: selection.work_list,
            ledger: TestLedger::new(selection.skipped),
        }
    }

    pub fn work_list(&self) -> &[ExampleId] {
        &self.work_list
    }

    /// Log the examples about to be tested
    pub fn list_tests(&self) {
        let tests: Vec<&str> = self.work_list().iter().map(|id| id.as_str()).collect();
        info!("tests:\n  {}", tests.join("\n  "));
    }

    /// Fetch dependencies, run the example's tests, then analyze it
    pub async fn run_one(&self, example: &ExampleId) -> Result<(), StepFailure> {
        let dir = example.dir_in(self.plan.root());
        let strategy = self.plan.strategy_for(&dir);

        self.step(Step::Fetch, self.plan.fetch(&dir)).await?;

        info!("Running {} tests for {}", strategy, example);
        self.step(Step::Test, self.plan.test(strategy, &dir)).await?;

        self.step(Step::Analyze, self.plan.analyze(&dir)).await?;
        Ok(())
    }

    async fn step(&self, step: Step, request: ExecRequest) -> Result<(), StepFailure> {
        self.executor
            .run(&request)
            .await
            .map(|_| ())
            .map_err(|error| StepFailure { step, error })
    }

    /// Test every example in the work list and return the filled ledger
    pub async fn run_all(mut self) -> TestLedger {
        self.list_tests();

        let work_list = std::mem::take(&mut self.work_list);
        for example in work_list {
            info!("START COMPONENT TESTING for {}", example);
            let timer = Timer::start(example.as_str());

            let result = self.run_one(&example).await;
            let duration_ms = timer.elapsed_ms();

            match result {
                Ok(()) => {
                    info!("✓ {} passed in {}ms", example, duration_ms);
                    self.ledger.record_pass(example, duration_ms);
                }
                Err(failure) => {
                    error!("Error preparing for or running tests for {}: {}", example, failure);
                    self.ledger
                        .record_failure(example, duration_ms, failure.step, failure.error.to_string());
                }
            }
        }

        self.ledger
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::models::{Catalog, SelectionFilters};
    use std::cell::RefCell;
    use std::path::PathBuf;

    /// Executor that fails commands matching a (directory, command) rule
    #[derive(Default)]
    struct ScriptedExecutor {
        failures: Vec<(&'static str, &'static str)>,
        output: Option<&'static str>,
        calls: RefCell<Vec<(String, PathBuf)>>,
    }

    impl ScriptedExecutor {
        fn failing(dir: &'static str, command: &'static str) -> Self {
            Self {
                failures: vec![(dir, command)],
                ..Default::default()
            }
        }

        fn commands_in(&self, dir: &str) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .filter(|(_, cwd)| cwd.ends_with(dir))
                .map(|(command, _)| command.clone())
                .collect()
        }
    }

    impl ProcessExecutor for ScriptedExecutor {
        async fn run(&self, request: &ExecRequest) -> Result<String, ExecError> {
            self.calls
                .borrow_mut()
                .push((request.command.clone(), request.cwd.clone()));

            let fails = self.failures.iter().any(|(dir, command)| {
                request.cwd.ends_with(dir) && request.command.starts_with(command)
            });
            let code = if fails { 1 } else { 0 };
            let output = self.output.unwrap_or("00:05 +4: All tests passed!");

            request.evaluate(Some(code), output)?;
            Ok(output.to_string())
        }
    }

    fn abc_selection(skip: Option<&str>) -> Selection {
        let catalog = Catalog::from_ids(vec![
            ExampleId::new("a"),
            ExampleId::new("b"),
            ExampleId::new("c"),
        ]);
        SelectionFilters::from_patterns(None, skip)
            .unwrap()
            .select(&catalog)
    }

    fn plan() -> CommandPlan {
        CommandPlan::from_config(&AppConfig::default()).unwrap()
    }

    fn ids(entries: &[crate::models::LedgerEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.example.as_str()).collect()
    }

    #[test]
    fn test_all_steps_pass() {
        let runner = ExampleRunner::new(ScriptedExecutor::default(), plan(), abc_selection(None));
        let ledger = tokio_test::block_on(runner.run_all());

        assert_eq!(ids(ledger.passed()), vec!["a", "b", "c"]);
        assert!(ledger.failed().is_empty());
        assert_eq!(ledger.exit_code(), 0);
    }

    #[test]
    fn test_steps_run_in_order() {
        let executor = ScriptedExecutor::default();
        let runner = ExampleRunner::new(executor, plan(), abc_selection(None));
        tokio_test::block_on(runner.run_one(&ExampleId::new("a"))).unwrap();

        assert_eq!(
            runner.executor.commands_in("examples/a"),
            vec![
                "pub get".to_string(),
                "pub run build_runner test --delete-conflicting-outputs -- -p chrome".to_string(),
                "dartanalyzer --preview-dart-2 --fatal-warnings .".to_string(),
            ]
        );
    }

    #[test]
    fn test_analyzer_failure_continues() {
        let executor = ScriptedExecutor::failing("examples/a", "dartanalyzer");
        let runner = ExampleRunner::new(executor, plan(), abc_selection(None));
        let ledger = tokio_test::block_on(runner.run_all());

        assert_eq!(ids(ledger.failed()), vec!["a"]);
        assert_eq!(ledger.failed()[0].step, Some(Step::Analyze));
        assert_eq!(ids(ledger.passed()), vec!["b", "c"]);
        assert_eq!(ledger.exit_code(), 1);
    }

    #[test]
    fn test_fetch_failure_stops_example() {
        let executor = ScriptedExecutor::failing("examples/b", "pub get");
        let runner = ExampleRunner::new(executor, plan(), abc_selection(None));

        let failure = tokio_test::block_on(runner.run_one(&ExampleId::new("b"))).unwrap_err();
        assert_eq!(failure.step, Step::Fetch);
        assert_eq!(runner.executor.commands_in("examples/b"), vec!["pub get".to_string()]);
    }

    #[test]
    fn test_missing_success_output_fails_test_step() {
        let executor = ScriptedExecutor {
            output: Some("00:05 +3 -1: Some tests failed."),
            ..Default::default()
        };
        let runner = ExampleRunner::new(executor, plan(), abc_selection(None));

        let failure = tokio_test::block_on(runner.run_one(&ExampleId::new("a"))).unwrap_err();
        assert_eq!(failure.step, Step::Test);
        assert!(matches!(failure.error, ExecError::MissingSuccessOutput { .. }));
    }

    #[test]
    fn test_build_only_needs_no_success_output() {
        let executor = ScriptedExecutor {
            output: Some("[INFO] Succeeded after 12.3s"),
            ..Default::default()
        };
        let selection = SelectionFilters::from_patterns(Some("lottery/1-base"), None)
            .unwrap()
            .select(&Catalog::build());
        let runner = ExampleRunner::new(executor, plan(), selection);
        let ledger = tokio_test::block_on(runner.run_all());

        assert_eq!(ids(ledger.passed()), vec!["acx/lottery/1-base"]);
    }

    #[test]
    fn test_benign_warning_passes() {
        let executor = ScriptedExecutor {
            output: Some("[WARNING] Invalidating asset graph due to build script update\nAll tests passed!"),
            ..Default::default()
        };
        let runner = ExampleRunner::new(executor, plan(), abc_selection(None));
        assert!(tokio_test::block_on(runner.run_one(&ExampleId::new("a"))).is_ok());
    }

    #[test]
    fn test_warning_fails_build_only() {
        let executor = ScriptedExecutor {
            output: Some("[WARNING] Something else"),
            ..Default::default()
        };
        let runner = ExampleRunner::new(executor, plan(), abc_selection(None));

        let failure =
            tokio_test::block_on(runner.run_one(&ExampleId::new("acx/lottery/3-usebuttons")))
                .unwrap_err();
        assert_eq!(failure.step, Step::Test);
        assert!(matches!(failure.error, ExecError::FailureOutput { .. }));
    }

    #[test]
    fn test_skip_scenario() {
        let executor = ScriptedExecutor::failing("examples/c", "pub run build_runner");
        let runner = ExampleRunner::new(executor, plan(), abc_selection(Some("b")));
        assert_eq!(runner.work_list(), &[ExampleId::new("a"), ExampleId::new("c")]);

        let ledger = tokio_test::block_on(runner.run_all());
        assert_eq!(ids(ledger.passed()), vec!["a"]);
        assert_eq!(ids(ledger.failed()), vec!["c"]);
        assert_eq!(ledger.skipped(), &[ExampleId::new("b")]);
        assert_eq!(ledger.exit_code(), 1);
    }
}
