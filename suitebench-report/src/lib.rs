#![warn(missing_docs)]
//! SuiteBench Report - Lifecycle Reporting
//!
//! Reporters observe a run as it happens:
//! - `SpecReporter`: human-readable progress, per-suite summaries, numbered failures
//! - `JsonReporter`: one machine-readable document at completion

mod format;
mod json;
mod report;
mod reporter;
mod spec;

pub use format::{format_number, round_secs};
pub use json::{
    JsonReport, JsonReporter, REPORT_SCHEMA, REPORT_SCHEMA_VERSION, ReportMeta,
    generate_json_report,
};
pub use report::{BenchmarkOutcome, RunSummary, SuiteOutcome};
pub use reporter::{
    BenchmarkStart, Reporter, ReporterKind, RunStart, SilentReporter, SuiteStart,
};
pub use spec::SpecReporter;
