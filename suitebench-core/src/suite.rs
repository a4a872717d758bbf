//! Suites and Benchmarks

use crate::error::SuiteError;
use crate::hooks::SuiteHooks;
use serde::{Deserialize, Serialize};

/// Benchmark body: one operation to measure
pub type BenchFn = Box<dyn FnMut() -> anyhow::Result<()>>;

/// Timing breakdown produced by the timing engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Times {
    /// Seconds taken by the last completed cycle
    pub cycle: f64,
    /// Seconds from the start of warmup to the end of measurement
    pub elapsed: f64,
    /// Seconds per operation
    pub period: f64,
    /// Wall-clock start of the measurement, ms since the Unix epoch
    pub time_stamp: i64,
}

/// Rate and timing statistics of one benchmark run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BenchStats {
    /// Operations per second
    pub hz: f64,
    /// Number of completed measured cycles
    pub cycles: u64,
    /// Operations executed per cycle
    pub count: u64,
    /// Timing breakdown
    pub times: Times,
}

impl BenchStats {
    /// Whether at least one measured cycle completed
    pub fn has_completed_cycle(&self) -> bool {
        self.cycles > 0
    }
}

/// Whether a suite's benchmarks are ranked against each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteKind {
    /// Independent benchmarks
    Suite,
    /// Benchmarks ranked by rate after completion
    Comparison,
}

/// One measured operation within a suite
pub struct Benchmark {
    name: String,
    body: BenchFn,
    /// Statistics reported by the timing engine
    pub stats: BenchStats,
    /// Body, cycle-hook or regression failure
    pub error: Option<SuiteError>,
    /// Failure of this benchmark's beforeEach hooks
    pub before_each_error: Option<SuiteError>,
}

impl Benchmark {
    pub(crate) fn new(name: String, body: BenchFn) -> Self {
        Self {
            name,
            body,
            stats: BenchStats::default(),
            error: None,
            before_each_error: None,
        }
    }

    /// Benchmark name, unique within its suite
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mutable access to the body for the timing engine
    pub fn body_mut(&mut self) -> &mut BenchFn {
        &mut self.body
    }

    /// Whether any failure is attached to this benchmark
    pub fn is_failed(&self) -> bool {
        self.error.is_some() || self.before_each_error.is_some()
    }

    /// Whether the benchmark produced data worth persisting
    pub fn is_completed(&self) -> bool {
        self.stats.has_completed_cycle()
    }
}

impl std::fmt::Debug for Benchmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Benchmark")
            .field("name", &self.name)
            .field("stats", &self.stats)
            .field("error", &self.error)
            .field("before_each_error", &self.before_each_error)
            .finish_non_exhaustive()
    }
}

/// Named group of benchmarks sharing hooks
#[derive(Debug)]
pub struct Suite {
    name: String,
    kind: SuiteKind,
    pub(crate) benchmarks: Vec<Benchmark>,
    pub(crate) hooks: SuiteHooks,
    /// Failure that aborted the suite (before hook) or broke its teardown
    pub error: Option<SuiteError>,
}

impl Suite {
    pub(crate) fn new(name: String, kind: SuiteKind) -> Self {
        Self {
            name,
            kind,
            benchmarks: Vec::new(),
            hooks: SuiteHooks::default(),
            error: None,
        }
    }

    /// Suite name, unique within a run
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Suite kind
    pub fn kind(&self) -> SuiteKind {
        self.kind
    }

    /// Whether this is a comparison suite
    pub fn is_comparison(&self) -> bool {
        self.kind == SuiteKind::Comparison
    }

    /// Benchmarks in declaration order
    pub fn benchmarks(&self) -> &[Benchmark] {
        &self.benchmarks
    }

    /// Number of benchmarks
    pub fn len(&self) -> usize {
        self.benchmarks.len()
    }

    /// Whether the suite declares no benchmarks
    pub fn is_empty(&self) -> bool {
        self.benchmarks.is_empty()
    }

    /// Hook sets of this suite
    pub fn hooks(&self) -> &SuiteHooks {
        &self.hooks
    }

    /// Split borrow used while executing: hooks stay shared while
    /// benchmarks record their outcomes.
    pub fn parts_mut(&mut self) -> (&SuiteHooks, &mut [Benchmark]) {
        (&self.hooks, &mut self.benchmarks)
    }

    /// Sum of the elapsed seconds of every benchmark
    pub fn elapsed_secs(&self) -> f64 {
        self.benchmarks.iter().map(|b| b.stats.times.elapsed).sum()
    }
}
