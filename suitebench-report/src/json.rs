//! JSON Output

use crate::report::{RunSummary, SuiteOutcome};
use crate::reporter::Reporter;
use serde::Serialize;
use std::io::{self, Write};
use suitebench_core::ErrorRecord;

/// Schema identifier written into every document
pub const REPORT_SCHEMA: &str = "suitebench-report";

/// Schema version written into every document
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Report metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    /// Schema identifier
    pub schema: &'static str,
    /// Schema version
    pub schema_version: u32,
    /// suitebench version that produced the report
    pub version: &'static str,
    /// Operating system
    pub os: &'static str,
    /// CPU architecture
    pub arch: &'static str,
}

impl Default for ReportMeta {
    fn default() -> Self {
        Self {
            schema: REPORT_SCHEMA,
            schema_version: REPORT_SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }
}

/// Complete machine-readable report of a run
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    /// Report metadata
    pub meta: ReportMeta,
    /// Suites that ran, in order
    pub suites: &'a [SuiteOutcome],
    /// Recorded errors, in order
    pub errors: &'a [ErrorRecord],
    /// Totals
    pub summary: &'a RunSummary,
}

/// Generate a prettified JSON report.
pub fn generate_json_report(report: &JsonReport<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Collects suite outcomes and writes one JSON document at completion
pub struct JsonReporter<W: Write> {
    out: W,
    suites: Vec<SuiteOutcome>,
}

impl<W: Write> JsonReporter<W> {
    /// Reporter writing to `out`
    pub fn new(out: W) -> Self {
        Self {
            out,
            suites: Vec::new(),
        }
    }

    /// Consume the reporter and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_complete_suite(&mut self, outcome: &SuiteOutcome) -> io::Result<()> {
        self.suites.push(outcome.clone());
        Ok(())
    }

    fn on_complete(&mut self, summary: &RunSummary, errors: &[ErrorRecord]) -> io::Result<()> {
        let report = JsonReport {
            meta: ReportMeta::default(),
            suites: &self.suites,
            errors,
            summary,
        };
        let json = generate_json_report(&report).map_err(io::Error::other)?;
        writeln!(self.out, "{json}")?;
        self.out.flush()
    }
}
