//! Run Driver
//!
//! Drives one invocation end to end:
//!
//! ```text
//! repository.load ─► reporter.on_start ─► scheduler ──┬─► Step::Run  ─► Session::run_suite
//!                                                      ├─► Step::Skip ─► (counted, silent)
//!                                                      └─► Exhausted
//!                                                               │
//! reporter.on_complete ◄─ repository.save ◄─ repository.add_run ◄┘
//! ```
//!
//! A reporter write error stops scheduling after the current suite's
//! teardown. The run is still added and saved before the error is returned.

mod scheduler;
mod session;

pub use scheduler::{Scheduler, Step};
pub use session::Session;

use anyhow::Context;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::process::{ExitCode, Termination};
use std::time::Instant;
use suitebench_core::{CycleEngine, ErrorRecord, Registry, TimingEngine};
use suitebench_history::{BaselineScope, MemoryRepository, Repository};
use suitebench_report::{Reporter, RunStart, RunSummary, SilentReporter, SuiteOutcome, round_secs};
use suitebench_stats::{Classifier, DEFAULT_ERROR_MARGIN};

/// Tag of the default in-memory repository
pub const LOCAL_TAG: &str = "local";

/// Options governing classification and suite selection
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Percentage change that counts as a regression or improvement
    pub error_margin: f64,
    /// Record regressions without failing the run
    pub allow_regressions: bool,
    /// Which earlier runs may serve as a baseline
    pub baseline_scope: BaselineScope,
    /// Only suites whose name matches run
    pub filter: Option<Regex>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            error_margin: DEFAULT_ERROR_MARGIN,
            allow_regressions: false,
            baseline_scope: BaselineScope::default(),
            filter: None,
        }
    }
}

/// Result of one invocation
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Totals
    pub summary: RunSummary,
    /// Every recorded failure, numbered by position
    pub errors: Vec<ErrorRecord>,
    /// Suites that ran, in order
    pub suites: Vec<SuiteOutcome>,
}

impl RunOutcome {
    /// Whether no failure of any kind was recorded
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Process exit status: 0 on success, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }
}

impl Termination for RunOutcome {
    fn report(self) -> ExitCode {
        ExitCode::from(self.exit_code())
    }
}

/// Orchestrates a run over its collaborators
pub struct Runner {
    options: RunOptions,
    engine: Box<dyn TimingEngine>,
    repository: Box<dyn Repository>,
    reporter: Box<dyn Reporter>,
}

impl Runner {
    /// Runner with the default engine, an in-memory repository and no output
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            engine: Box::new(CycleEngine::default()),
            repository: Box::new(MemoryRepository::new(LOCAL_TAG)),
            reporter: Box::new(SilentReporter),
        }
    }

    /// Replace the timing engine
    pub fn with_engine(mut self, engine: impl TimingEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Replace the run repository
    pub fn with_repository(mut self, repository: impl Repository + 'static) -> Self {
        self.repository = Box::new(repository);
        self
    }

    /// Replace the reporter
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Options in effect
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run repository, including the run recorded by the last [`Runner::run`]
    pub fn repository(&self) -> &dyn Repository {
        self.repository.as_ref()
    }

    /// Execute every eligible suite in declaration order and record the run
    pub fn run(&mut self, registry: Registry) -> anyhow::Result<RunOutcome> {
        let started = Instant::now();
        let started_at: DateTime<Utc> = Utc::now();

        self.repository
            .load()
            .context("Failed to load run history")?;

        let (mut suites, filter) = registry.into_parts();
        let mut scheduler = Scheduler::new(filter.with_pattern(self.options.filter.clone()));
        let tag = self.repository.tag().to_string();

        tracing::info!(suites = suites.len(), tag = %tag, "starting run");
        self.reporter
            .on_start(&RunStart {
                suites: &suites,
                tag: &tag,
            })
            .context("Failed to write report")?;

        let mut session = Session::new(
            self.engine.as_mut(),
            self.repository.as_ref(),
            self.reporter.as_mut(),
            Classifier::new(self.options.error_margin),
            self.options.baseline_scope,
            self.options.allow_regressions,
        );

        let mut outcomes = Vec::new();
        let mut skipped = 0;
        let mut report_error = None;
        loop {
            match scheduler.advance(&suites) {
                Step::Run(index) => {
                    outcomes.push(session.run_suite(&mut suites[index]));
                    report_error = session.take_report_error();
                    if report_error.is_some() {
                        break;
                    }
                }
                Step::Skip { index, reason } => {
                    tracing::debug!(suite = suites[index].name(), %reason, "suite skipped");
                    skipped += 1;
                }
                Step::Exhausted => break,
            }
        }
        let (errors, passing) = session.finish();

        self.repository
            .add_run(&suites, self.options.allow_regressions);
        self.repository
            .save()
            .context("Failed to save run history")?;
        if let Some(error) = report_error {
            return Err(anyhow::Error::new(error).context("Failed to write report"));
        }

        let summary = RunSummary {
            tag,
            started_at,
            suites_run: outcomes.len(),
            suites_skipped: skipped,
            passing,
            failing: errors.count(),
            suites_secs: round_secs(outcomes.iter().map(|s| s.elapsed_secs).sum()),
            total_secs: round_secs(started.elapsed().as_secs_f64()),
        };
        self.reporter
            .on_complete(&summary, errors.records())
            .context("Failed to write report")?;

        tracing::info!(
            passing = summary.passing,
            failing = summary.failing,
            skipped = summary.suites_skipped,
            "run complete"
        );

        Ok(RunOutcome {
            summary,
            errors: errors.records().to_vec(),
            suites: outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;
    use suitebench_report::SuiteStart;

    fn one_cycle_engine() -> CycleEngine {
        CycleEngine::new(suitebench_core::EngineConfig {
            warmup_time: std::time::Duration::ZERO,
            measurement_time: std::time::Duration::ZERO,
            min_cycle_time: std::time::Duration::from_micros(10),
            min_cycles: 1,
            max_cycles: Some(1),
        })
    }

    struct ClosedStdout;

    impl Reporter for ClosedStdout {
        fn on_start_suite(&mut self, _start: &SuiteStart<'_>) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
        }
    }

    #[test]
    fn test_reporter_failure_tears_down_and_saves() {
        let hooks: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let mut registry = Registry::new();
        {
            let hooks = hooks.clone();
            registry.suite("first", move |s| {
                let before = hooks.clone();
                s.before(move || {
                    before.borrow_mut().push("before");
                    Ok(())
                });
                let after = hooks.clone();
                s.after(move || {
                    after.borrow_mut().push("after");
                    Ok(())
                });
                s.bench("noop", || ());
            });
        }
        {
            let hooks = hooks.clone();
            registry.suite("second", move |s| {
                let before = hooks.clone();
                s.before(move || {
                    before.borrow_mut().push("second before");
                    Ok(())
                });
            });
        }

        let mut runner = Runner::new(RunOptions::default())
            .with_engine(one_cycle_engine())
            .with_reporter(ClosedStdout);
        let err = runner.run(registry).unwrap_err();

        assert!(err.to_string().contains("Failed to write report"));
        assert_eq!(*hooks.borrow(), vec!["before", "after"]);
        let runs = runner.repository().runs();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].get("first", "noop").is_some());
    }

    #[test]
    fn test_exit_code_follows_errors() {
        let mut runner = Runner::new(RunOptions::default()).with_engine(one_cycle_engine());

        let mut registry = Registry::new();
        registry.suite("ok", |s| {
            s.bench("noop", || ());
        });
        let outcome = runner.run(registry).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.summary.passing, 1);

        let mut registry = Registry::new();
        registry.suite("broken", |s| {
            s.after(|| anyhow::bail!("teardown failed"));
            s.bench("noop", || ());
        });
        let outcome = runner.run(registry).unwrap();
        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(outcome.summary.failing, 1);
        assert_eq!(runner.repository().runs().len(), 1);
    }
}
