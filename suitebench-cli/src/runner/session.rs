//! Suite Session
//!
//! Runs one suite's lifecycle at a time and contains every failure at the
//! checkpoint where it happens:
//!
//! ```text
//! before ──failed──────────────────────────────────────────┐
//!   │                                                      │
//!   ▼ for each benchmark                                   │
//! beforeEach ──failed──┐                                   │
//!   │                  │                                   │
//!   ▼                  │                                   │
//! engine.measure       │   (beforeCycle/afterCycle per cycle)
//!   │                  │                                   │
//!   ▼                  │                                   │
//! classify             │                                   │
//!   │                  │                                   │
//!   ▼                  ▼                                   │
//! afterEach ◄──────────┘                                   │
//!   │                                                      │
//!   ▼                                                      ▼
//! after ◄──────────────────────────────────────────────────┘
//! ```
//!
//! Every failure is appended once to the session's [`ErrorLog`] and never
//! leaves the suite. A reporter write error is held until the suite's
//! `after` hooks have run; later events are not delivered.

use std::io;
use suitebench_core::{
    Benchmark, Checkpoint, CycleHooks, ErrorLog, ErrorRecord, HookContext, HookResult, HookSet,
    HookStage, Suite, SuiteError, SuiteHooks, TimingEngine, guarded,
};
use suitebench_history::{BaselineScope, Repository};
use suitebench_report::{
    BenchmarkOutcome, BenchmarkStart, Reporter, SuiteOutcome, SuiteStart, round_secs,
};
use suitebench_stats::{Classification, Classifier, rank};

/// Cycle hooks of the suite being run
struct SuiteCycleHooks<'h> {
    hooks: &'h SuiteHooks,
    suite: &'h str,
    benchmark: &'h str,
}

impl SuiteCycleHooks<'_> {
    fn context(&self, cycle: u64) -> HookContext<'_> {
        HookContext::suite(self.suite)
            .benchmark(self.benchmark)
            .cycle(cycle)
    }
}

impl CycleHooks for SuiteCycleHooks<'_> {
    fn before_cycle(&mut self, cycle: u64) -> HookResult {
        self.hooks.before_cycle.run(&self.context(cycle))
    }

    fn after_cycle(&mut self, cycle: u64) -> HookResult {
        self.hooks.after_cycle.run(&self.context(cycle))
    }
}

/// Mutable state of one run: collaborators, error log and counters
pub struct Session<'a> {
    engine: &'a mut dyn TimingEngine,
    repository: &'a dyn Repository,
    reporter: &'a mut dyn Reporter,
    classifier: Classifier,
    baseline_scope: BaselineScope,
    allow_regressions: bool,
    errors: ErrorLog,
    passing: usize,
    report_error: Option<io::Error>,
}

impl<'a> Session<'a> {
    /// Start a session
    pub fn new(
        engine: &'a mut dyn TimingEngine,
        repository: &'a dyn Repository,
        reporter: &'a mut dyn Reporter,
        classifier: Classifier,
        baseline_scope: BaselineScope,
        allow_regressions: bool,
    ) -> Self {
        Self {
            engine,
            repository,
            reporter,
            classifier,
            baseline_scope,
            allow_regressions,
            errors: ErrorLog::new(),
            passing: 0,
            report_error: None,
        }
    }

    /// Errors recorded so far
    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    /// Benchmarks that passed so far
    pub fn passing(&self) -> usize {
        self.passing
    }

    /// First reporter write error, if any; clears it
    pub fn take_report_error(&mut self) -> Option<io::Error> {
        self.report_error.take()
    }

    /// End the session, returning the error log and the passing count
    pub fn finish(self) -> (ErrorLog, usize) {
        (self.errors, self.passing)
    }

    /// Deliver one reporter event unless an earlier one failed
    fn report(&mut self, event: impl FnOnce(&mut dyn Reporter) -> io::Result<()>) {
        if self.report_error.is_some() {
            return;
        }
        if let Err(error) = event(&mut *self.reporter) {
            tracing::warn!(%error, "reporter failed, dropping further events");
            self.report_error = Some(error);
        }
    }

    fn record(&mut self, suite: &str, label: String, error: &SuiteError) -> usize {
        let number = self.errors.push(ErrorRecord::new(suite, label, error));
        tracing::debug!(suite, error_number = number, error = %error, "failure recorded");
        number
    }

    /// Run one hook set and record its failure, if any
    fn checkpoint(
        &mut self,
        suite: &str,
        hooks: &HookSet,
        stage: HookStage,
        benchmark: &str,
    ) -> (Checkpoint, Option<SuiteError>) {
        tracing::trace!(suite, benchmark, %stage, hooks = hooks.len(), "checkpoint");
        let mut context = HookContext::suite(suite);
        if !benchmark.is_empty() {
            context = context.benchmark(benchmark);
        }
        match hooks.run(&context) {
            Ok(()) => (Checkpoint::Passed, None),
            Err(source) => {
                let error = SuiteError::Hook { stage, source };
                let error_number = self.record(suite, stage.label(benchmark), &error);
                let checkpoint = Checkpoint::HookFailed {
                    stage,
                    error_number,
                    message: error.to_string(),
                };
                (checkpoint, Some(error))
            }
        }
    }

    /// Run a suite's full lifecycle.
    ///
    /// Always runs to the `after` checkpoint; check
    /// [`Session::take_report_error`] for a failed reporter.
    pub fn run_suite(&mut self, suite: &mut Suite) -> SuiteOutcome {
        let suite_name = suite.name().to_string();
        tracing::debug!(suite = %suite_name, benchmarks = suite.len(), "suite started");

        let (before, before_error) =
            self.checkpoint(&suite_name, &suite.hooks().before, HookStage::Before, "");
        suite.error = before_error;
        let start = SuiteStart {
            suite: &*suite,
            before: &before,
        };
        self.report(|reporter| reporter.on_start_suite(&start));

        let mut benchmarks = Vec::new();
        if before.is_passed() {
            let total = suite.len();
            let (hooks, entries) = suite.parts_mut();
            for (index, benchmark) in entries.iter_mut().enumerate() {
                let outcome = self.run_benchmark(&suite_name, hooks, benchmark, index, total);
                benchmarks.push(outcome);
            }
        } else {
            tracing::debug!(suite = %suite_name, "before hook failed, skipping benchmarks");
        }

        let (after, after_error) =
            self.checkpoint(&suite_name, &suite.hooks().after, HookStage::After, "");
        if suite.error.is_none() {
            suite.error = after_error;
        }

        let ranking = if suite.is_comparison() {
            rank(
                benchmarks
                    .iter()
                    .filter(|b| b.is_passed() && b.stats.cycles > 0)
                    .map(|b| (b.name.as_str(), b.stats.hz)),
            )
        } else {
            None
        };

        let outcome = SuiteOutcome {
            name: suite_name,
            kind: suite.kind(),
            before,
            after,
            benchmarks,
            elapsed_secs: round_secs(suite.elapsed_secs()),
            ranking,
        };
        self.report(|reporter| reporter.on_complete_suite(&outcome));
        tracing::debug!(
            suite = %outcome.name,
            failed = outcome.is_failed(),
            "suite completed"
        );
        outcome
    }

    fn run_benchmark(
        &mut self,
        suite: &str,
        hooks: &SuiteHooks,
        benchmark: &mut Benchmark,
        index: usize,
        total: usize,
    ) -> BenchmarkOutcome {
        let name = benchmark.name().to_string();
        self.report(|reporter| {
            reporter.on_start_benchmark(&BenchmarkStart {
                suite,
                name: &name,
                index,
                total,
            })
        });

        let (before_each, before_each_error) =
            self.checkpoint(suite, &hooks.before_each, HookStage::BeforeEach, &name);
        let mut classification = Classification::NoBaseline;
        let mut error_number = None;

        if before_each_error.is_some() {
            benchmark.before_each_error = before_each_error;
        } else {
            let report = {
                let mut cycle_hooks = SuiteCycleHooks {
                    hooks,
                    suite,
                    benchmark: &name,
                };
                let body = benchmark.body_mut();
                let mut guarded_body = || guarded(|| body());
                self.engine.measure(&mut guarded_body, &mut cycle_hooks)
            };
            benchmark.stats = report.stats;

            if let Some(error) = report.error {
                let label = match &error {
                    SuiteError::Hook { stage, .. } => stage.label(&name),
                    _ => name.clone(),
                };
                error_number = Some(self.record(suite, label, &error));
                benchmark.error = Some(error);
            } else if benchmark.is_completed() {
                let previous = self
                    .repository
                    .previous_run(suite, &name, self.baseline_scope)
                    .map(|stats| stats.hz);
                classification = self.classifier.classify(benchmark.stats.hz, previous);

                if let Classification::Regression(delta) = classification {
                    if !self.allow_regressions {
                        let error = SuiteError::Regression {
                            difference: delta.difference,
                            percentage_difference: delta.percentage_difference,
                        };
                        error_number = Some(self.record(suite, name.clone(), &error));
                        benchmark.error = Some(error);
                    }
                }
            }

            if benchmark.error.is_none() {
                self.passing += 1;
            }
        }

        let (after_each, _) =
            self.checkpoint(suite, &hooks.after_each, HookStage::AfterEach, &name);

        let outcome = BenchmarkOutcome {
            suite: suite.to_string(),
            name,
            stats: benchmark.stats,
            classification,
            before_each,
            after_each,
            error: benchmark.error.as_ref().map(ToString::to_string),
            error_number,
        };
        self.report(|reporter| reporter.on_complete_benchmark(&outcome));
        outcome
    }
}
