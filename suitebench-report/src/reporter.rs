//! Reporter Lifecycle
//!
//! The runner notifies a [`Reporter`] at every lifecycle transition:
//!
//! ```text
//! on_start
//!   on_start_suite          (after the suite's before hooks ran)
//!     on_start_benchmark    (before its beforeEach hooks run)
//!     on_complete_benchmark (after afterEach hooks and classification)
//!   on_complete_suite       (after the suite's after hooks ran)
//! on_complete               (after the run was recorded and saved)
//! ```
//!
//! Skipped suites produce no notifications.

use crate::report::{BenchmarkOutcome, RunSummary, SuiteOutcome};
use std::io;
use suitebench_core::{Checkpoint, ErrorRecord, Suite};

/// Run is about to start
#[derive(Debug, Clone, Copy)]
pub struct RunStart<'a> {
    /// Every declared suite, including those that will be skipped
    pub suites: &'a [Suite],
    /// Active tag
    pub tag: &'a str,
}

/// A suite started and its before hooks ran
#[derive(Debug, Clone, Copy)]
pub struct SuiteStart<'a> {
    /// The suite
    pub suite: &'a Suite,
    /// Outcome of its before hooks
    pub before: &'a Checkpoint,
}

/// A benchmark is about to start
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkStart<'a> {
    /// Owning suite
    pub suite: &'a str,
    /// Benchmark name
    pub name: &'a str,
    /// Position within the suite, 0-based
    pub index: usize,
    /// Number of benchmarks in the suite
    pub total: usize,
}

/// Observer of a run's lifecycle
pub trait Reporter {
    /// Run started
    fn on_start(&mut self, _start: &RunStart<'_>) -> io::Result<()> {
        Ok(())
    }

    /// Suite started
    fn on_start_suite(&mut self, _start: &SuiteStart<'_>) -> io::Result<()> {
        Ok(())
    }

    /// Benchmark started
    fn on_start_benchmark(&mut self, _start: &BenchmarkStart<'_>) -> io::Result<()> {
        Ok(())
    }

    /// Benchmark completed
    fn on_complete_benchmark(&mut self, _outcome: &BenchmarkOutcome) -> io::Result<()> {
        Ok(())
    }

    /// Suite completed
    fn on_complete_suite(&mut self, _outcome: &SuiteOutcome) -> io::Result<()> {
        Ok(())
    }

    /// Run finished
    fn on_complete(&mut self, _summary: &RunSummary, _errors: &[ErrorRecord]) -> io::Result<()> {
        Ok(())
    }
}

impl<R: Reporter + ?Sized> Reporter for Box<R> {
    fn on_start(&mut self, start: &RunStart<'_>) -> io::Result<()> {
        (**self).on_start(start)
    }

    fn on_start_suite(&mut self, start: &SuiteStart<'_>) -> io::Result<()> {
        (**self).on_start_suite(start)
    }

    fn on_start_benchmark(&mut self, start: &BenchmarkStart<'_>) -> io::Result<()> {
        (**self).on_start_benchmark(start)
    }

    fn on_complete_benchmark(&mut self, outcome: &BenchmarkOutcome) -> io::Result<()> {
        (**self).on_complete_benchmark(outcome)
    }

    fn on_complete_suite(&mut self, outcome: &SuiteOutcome) -> io::Result<()> {
        (**self).on_complete_suite(outcome)
    }

    fn on_complete(&mut self, summary: &RunSummary, errors: &[ErrorRecord]) -> io::Result<()> {
        (**self).on_complete(summary, errors)
    }
}

/// Reporter that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}

/// Built-in reporter selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReporterKind {
    /// Human-readable progress and summary
    #[default]
    Spec,
    /// One JSON document at completion
    Json,
}

impl std::str::FromStr for ReporterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spec" | "human" => Ok(ReporterKind::Spec),
            "json" => Ok(ReporterKind::Json),
            other => Err(format!("Unknown reporter: {}", other)),
        }
    }
}

impl std::fmt::Display for ReporterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReporterKind::Spec => write!(f, "spec"),
            ReporterKind::Json => write!(f, "json"),
        }
    }
}
