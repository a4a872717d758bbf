#![warn(missing_docs)]
//! # SuiteBench
//!
//! Benchmark suites for Rust with lifecycle hooks, run history and CI regression gating.
//!
//! SuiteBench orchestrates named suites of benchmarks:
//! - **Suites & Comparisons**: group benchmarks, rank comparison suites by ops/sec
//! - **Only/Skip**: focus on a few suites or park others without deleting them
//! - **Lifecycle Hooks**: before/after, beforeEach/afterEach, beforeCycle/afterCycle
//! - **Error Containment**: a failing hook or panicking body never stops the run
//! - **Run History**: one record per tag (git commit, version, date or custom)
//! - **Regression Gating**: slowdowns beyond the error margin fail the run
//!
//! ## Quick Start
//!
//! ```ignore
//! use suitebench::prelude::*;
//!
//! fn main() -> anyhow::Result<RunOutcome> {
//!     let mut registry = Registry::new();
//!     registry.suite("parsing", |s| {
//!         s.before(|| load_fixtures());
//!         s.bench("small input", || parse(SMALL));
//!     });
//!     suitebench::run(registry)
//! }
//! ```
//!
//! ## Comparisons
//!
//! ```ignore
//! registry.compare("substring search", |s| {
//!     s.bench("Regex::is_match", move || re.is_match(TEXT));
//!     s.bench("str::contains", || TEXT.contains("orl"));
//! });
//! ```
//!
//! ## Async Hooks
//!
//! ```ignore
//! s.before(Hook::from_async(|| async {
//!     tokio::time::sleep(Duration::from_millis(10)).await;
//!     Ok(())
//! }));
//! ```

// Re-export core types
pub use suitebench_core::{
    BenchOutput, BenchStats, Benchmark, Checkpoint, CycleEngine, CycleHooks, EngineConfig,
    EngineReport, Eligibility, ErrorKind, ErrorLog, ErrorRecord, Hook, HookContext, HookResult,
    HookSet, HookStage, IntoHook, NoCycleHooks, Registry, SkipReason, Suite, SuiteBuilder, SuiteError,
    SuiteFilter, SuiteHooks, SuiteKind, Times, TimingEngine, guarded,
};

// Re-export stats
pub use suitebench_stats::{
    Classification, Classifier, DEFAULT_ERROR_MARGIN, Delta, Ranking, rank, round3,
};

// Re-export history
pub use suitebench_history::{
    BaselineScope, DEFAULT_HISTORY_FILE, FileRepository, HistoryError, MemoryRepository,
    Repository, RunHistory, RunRecord, SuiteStats, TagSource,
};

// Re-export reporting
pub use suitebench_report::{
    BenchmarkOutcome, BenchmarkStart, JsonReporter, Reporter, ReporterKind, RunStart, RunSummary,
    SilentReporter, SpecReporter, SuiteOutcome, SuiteStart,
};

// Re-export the driver
pub use suitebench_cli::{Cli, RunOptions, RunOutcome, Runner, Settings, SuiteConfig};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BaselineScope, Hook, HookContext, HookResult, Registry, RunOptions, RunOutcome, Runner,
        SuiteBuilder,
    };
}

/// Run the SuiteBench CLI harness over `registry`.
///
/// Call this from your benchmark binary's `main()`; the returned
/// [`RunOutcome`] sets the exit status:
/// ```ignore
/// fn main() -> anyhow::Result<suitebench::RunOutcome> {
///     suitebench::run(registry())
/// }
/// ```
pub use suitebench_cli::run;
