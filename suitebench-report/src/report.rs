//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::Serialize;
use suitebench_core::{BenchStats, Checkpoint, SuiteKind};
use suitebench_stats::{Classification, Ranking};

/// What happened to one benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkOutcome {
    /// Owning suite
    pub suite: String,
    /// Benchmark name
    pub name: String,
    /// Stats reported by the timing engine (`cycles == 0` if nothing ran)
    pub stats: BenchStats,
    /// Rate verdict against the baseline
    pub classification: Classification,
    /// beforeEach hooks
    pub before_each: Checkpoint,
    /// afterEach hooks
    pub after_each: Checkpoint,
    /// Body, cycle-hook or regression failure message
    pub error: Option<String>,
    /// Error number of that failure
    pub error_number: Option<usize>,
}

impl BenchmarkOutcome {
    /// Whether the benchmark ran and nothing attached to it failed.
    ///
    /// afterEach failures do not change this.
    pub fn is_passed(&self) -> bool {
        self.before_each.is_passed() && self.error.is_none()
    }
}

/// What happened to one suite
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteOutcome {
    /// Suite name
    pub name: String,
    /// Suite kind
    pub kind: SuiteKind,
    /// before hooks; on failure no benchmark ran
    pub before: Checkpoint,
    /// after hooks
    pub after: Checkpoint,
    /// Benchmarks that were started, in declaration order
    pub benchmarks: Vec<BenchmarkOutcome>,
    /// Sum of the benchmarks' elapsed seconds, rounded to milliseconds
    pub elapsed_secs: f64,
    /// Fastest-first ranking (comparison suites only)
    pub ranking: Option<Ranking>,
}

impl SuiteOutcome {
    /// Whether the suite ranks its benchmarks
    pub fn is_comparison(&self) -> bool {
        self.kind == SuiteKind::Comparison
    }

    /// Whether a suite-level hook or any benchmark failed
    pub fn is_failed(&self) -> bool {
        !self.before.is_passed()
            || !self.after.is_passed()
            || self
                .benchmarks
                .iter()
                .any(|b| !b.is_passed() || !b.after_each.is_passed())
    }
}

/// Totals of a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Active tag
    pub tag: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Suites that ran their lifecycle
    pub suites_run: usize,
    /// Suites skipped by only/skip/empty/pattern rules
    pub suites_skipped: usize,
    /// Benchmarks that passed
    pub passing: usize,
    /// Recorded errors
    pub failing: usize,
    /// Seconds spent inside benchmarks
    pub suites_secs: f64,
    /// Wall-clock seconds of the whole run
    pub total_secs: f64,
}

impl RunSummary {
    /// Exit-status view: the run succeeded iff nothing was recorded as failing
    pub fn is_success(&self) -> bool {
        self.failing == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suitebench_core::HookStage;

    fn outcome(before_each: Checkpoint, error: Option<&str>) -> BenchmarkOutcome {
        BenchmarkOutcome {
            suite: "s".to_string(),
            name: "b".to_string(),
            stats: BenchStats::default(),
            classification: Classification::NoBaseline,
            before_each,
            after_each: Checkpoint::Passed,
            error: error.map(str::to_string),
            error_number: error.map(|_| 1),
        }
    }

    #[test]
    fn test_benchmark_pass_status() {
        assert!(outcome(Checkpoint::Passed, None).is_passed());
        assert!(!outcome(Checkpoint::Passed, Some("boom")).is_passed());

        let failed_hook = Checkpoint::HookFailed {
            stage: HookStage::BeforeEach,
            error_number: 1,
            message: "fixture".to_string(),
        };
        assert!(!outcome(failed_hook, None).is_passed());
    }

    #[test]
    fn test_after_each_failure_keeps_pass_but_fails_suite() {
        let mut bench = outcome(Checkpoint::Passed, None);
        bench.after_each = Checkpoint::HookFailed {
            stage: HookStage::AfterEach,
            error_number: 1,
            message: "cleanup".to_string(),
        };
        assert!(bench.is_passed());

        let suite = SuiteOutcome {
            name: "s".to_string(),
            kind: SuiteKind::Suite,
            before: Checkpoint::Passed,
            after: Checkpoint::Passed,
            benchmarks: vec![bench],
            elapsed_secs: 0.0,
            ranking: None,
        };
        assert!(suite.is_failed());
    }
}
