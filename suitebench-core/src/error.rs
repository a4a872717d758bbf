//! Error Taxonomy
//!
//! Failures that are contained inside a suite: hook failures, benchmark body
//! failures and synthetic regression failures. Each one is turned into an
//! [`ErrorRecord`] and appended to the run's [`ErrorLog`], which drives the
//! final exit status.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lifecycle checkpoint a hook is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HookStage {
    /// Once before the first benchmark of a suite
    Before,
    /// Once after the last benchmark of a suite
    After,
    /// Before every benchmark
    BeforeEach,
    /// After every benchmark
    AfterEach,
    /// Before every measured cycle
    BeforeCycle,
    /// After every measured cycle
    AfterCycle,
}

impl HookStage {
    /// Label used in error records: suite-level stages are unqualified,
    /// benchmark-level stages name the benchmark.
    pub fn label(self, benchmark: &str) -> String {
        match self {
            HookStage::Before | HookStage::After => format!("{self} hook"),
            _ => format!("{self} hook for {benchmark}"),
        }
    }

    /// Whether this stage belongs to a single benchmark rather than the suite
    pub fn is_per_benchmark(self) -> bool {
        !matches!(self, HookStage::Before | HookStage::After)
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookStage::Before => "before",
            HookStage::After => "after",
            HookStage::BeforeEach => "beforeEach",
            HookStage::AfterEach => "afterEach",
            HookStage::BeforeCycle => "beforeCycle",
            HookStage::AfterCycle => "afterCycle",
        };
        f.write_str(name)
    }
}

/// A failure contained at a checkpoint boundary
#[derive(Debug, Error)]
pub enum SuiteError {
    /// A hook returned an error or panicked
    #[error("{source}")]
    Hook {
        /// Checkpoint the hook belongs to
        stage: HookStage,
        /// Underlying failure
        #[source]
        source: anyhow::Error,
    },

    /// The benchmark body returned an error or panicked
    #[error("{source}")]
    Body {
        /// Underlying failure
        #[source]
        source: anyhow::Error,
    },

    /// The benchmark got slower than its baseline and regressions are not allowed
    #[error("Regression error: {percentage_difference}% slower than baseline")]
    Regression {
        /// Lost operations per second
        difference: f64,
        /// Slowdown relative to the baseline, in percent
        percentage_difference: f64,
    },
}

impl SuiteError {
    /// Classification of this error for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            SuiteError::Hook { stage, .. } => ErrorKind::Hook(*stage),
            SuiteError::Body { .. } => ErrorKind::Body,
            SuiteError::Regression { .. } => ErrorKind::Regression,
        }
    }

    /// Cause chain below the top-level message
    pub fn stack(&self) -> Vec<String> {
        match self {
            SuiteError::Hook { source, .. } | SuiteError::Body { source } => {
                source.chain().skip(1).map(|cause| cause.to_string()).collect()
            }
            SuiteError::Regression { .. } => Vec::new(),
        }
    }
}

/// Error classification carried by an [`ErrorRecord`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "stage")]
pub enum ErrorKind {
    /// Hook failure at the given stage
    Hook(HookStage),
    /// Benchmark body failure
    Body,
    /// Disallowed regression
    Regression,
}

/// One recorded failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    /// Suite the failure happened in
    pub suite_name: String,
    /// Benchmark name, or the hook label ("before hook", "afterEach hook for x")
    pub benchmark_name: String,
    /// What failed
    pub kind: ErrorKind,
    /// Top-level error message
    pub message: String,
    /// Cause chain, outermost first
    pub stack: Vec<String>,
}

impl ErrorRecord {
    /// Build a record from a contained error
    pub fn new(suite_name: &str, benchmark_name: impl Into<String>, error: &SuiteError) -> Self {
        Self {
            suite_name: suite_name.to_string(),
            benchmark_name: benchmark_name.into(),
            kind: error.kind(),
            message: error.to_string(),
            stack: error.stack(),
        }
    }
}

/// Append-only log of every failure in a run
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    records: Vec<ErrorRecord>,
}

impl ErrorLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record and return its 1-based error number
    pub fn push(&mut self, record: ErrorRecord) -> usize {
        self.records.push(record);
        self.records.len()
    }

    /// Number of recorded errors
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing failed
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in the order they were appended
    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(HookStage::Before.label("x"), "before hook");
        assert_eq!(HookStage::After.label("x"), "after hook");
        assert_eq!(HookStage::BeforeEach.label("parse"), "beforeEach hook for parse");
        assert_eq!(HookStage::AfterEach.label("parse"), "afterEach hook for parse");
        assert_eq!(HookStage::AfterCycle.label("parse"), "afterCycle hook for parse");
    }

    #[test]
    fn test_record_keeps_cause_chain() {
        let source = anyhow::anyhow!("disk full").context("could not open fixture");
        let error = SuiteError::Hook {
            stage: HookStage::Before,
            source,
        };
        let record = ErrorRecord::new("io", HookStage::Before.label("io"), &error);

        assert_eq!(record.message, "could not open fixture");
        assert_eq!(record.stack, vec!["disk full".to_string()]);
        assert_eq!(record.kind, ErrorKind::Hook(HookStage::Before));
    }

    #[test]
    fn test_error_log_numbers() {
        let mut log = ErrorLog::new();
        let error = SuiteError::Regression {
            difference: 4.0,
            percentage_difference: 4.0,
        };
        assert_eq!(log.push(ErrorRecord::new("s", "a", &error)), 1);
        assert_eq!(log.push(ErrorRecord::new("s", "b", &error)), 2);
        assert_eq!(log.count(), 2);
        assert!(!log.is_empty());
    }
}
