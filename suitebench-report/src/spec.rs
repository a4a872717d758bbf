//! Human-readable reporter.
//!
//! ```text
//!     Suite: parsing
//!         ✓ small input 1.021s (48,113 ops/sec)
//!         ✓ large input 1.004s (512 ops/sec) ✗ 4.2% slower
//!         1) Before each hook for broken: fixture missing
//!         Suite: parsing failed in 2.025s
//!
//!   2 passing (2.025s)
//!   1 failing
//! ```

use crate::format::{format_number, round_secs};
use crate::report::{BenchmarkOutcome, RunSummary, SuiteOutcome};
use crate::reporter::{BenchmarkStart, Reporter, SuiteStart};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use suitebench_core::{Checkpoint, ErrorRecord};
use suitebench_stats::Classification;

const INDENT: &str = "    ";

fn indent(level: usize) -> String {
    INDENT.repeat(level)
}

/// Prints suites and benchmarks as they complete, then a numbered failure list
pub struct SpecReporter<W: Write> {
    out: W,
    progress: bool,
    spinner: Option<ProgressBar>,
}

impl SpecReporter<io::Stdout> {
    /// Reporter on stdout; shows a spinner when stdout is a terminal
    pub fn stdout() -> Self {
        let progress = io::stdout().is_terminal();
        Self::new(io::stdout()).with_progress(progress)
    }
}

impl<W: Write> SpecReporter<W> {
    /// Reporter writing to `out`, without a spinner
    pub fn new(out: W) -> Self {
        Self {
            out,
            progress: false,
            spinner: None,
        }
    }

    /// Show a spinner while each benchmark runs
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Consume the reporter and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn clear_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn hook_failure(&mut self, checkpoint: &Checkpoint, what: &str) -> io::Result<()> {
        if let Checkpoint::HookFailed {
            error_number,
            message,
            ..
        } = checkpoint
        {
            writeln!(
                self.out,
                "{}{}) {}: {}",
                indent(2),
                error_number,
                what,
                message
            )?;
        }
        Ok(())
    }

    fn benchmark_line(&self, outcome: &BenchmarkOutcome) -> String {
        let marker = match outcome.error_number {
            Some(n) => format!("{n})"),
            None => "✓".to_string(),
        };
        let mut line = format!(
            "{}{} {} {}s ({} ops/sec)",
            indent(2),
            marker,
            outcome.name,
            round_secs(outcome.stats.times.elapsed),
            format_number(outcome.stats.hz)
        );

        match &outcome.classification {
            Classification::Regression(delta) => {
                line.push_str(&format!(" ✗ {}% slower", delta.percentage_difference));
            }
            Classification::Improvement(delta) => {
                line.push_str(&format!(" ✓ {}% faster", delta.percentage_difference));
            }
            _ => {}
        }

        // Regression errors are already shown as "% slower"
        if let Some(error) = &outcome.error {
            if !outcome.classification.is_regression() {
                line.push_str(&format!(": {error}"));
            }
        }
        line
    }
}

impl<W: Write> Reporter for SpecReporter<W> {
    fn on_start_suite(&mut self, start: &SuiteStart<'_>) -> io::Result<()> {
        let label = if start.suite.is_comparison() {
            "Compare:"
        } else {
            "Suite:"
        };
        writeln!(self.out)?;
        writeln!(self.out, "{}{} {}", indent(1), label, start.suite.name())?;
        self.hook_failure(start.before, "Before hook")
    }

    fn on_start_benchmark(&mut self, start: &BenchmarkStart<'_>) -> io::Result<()> {
        if !self.progress {
            return Ok(());
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!(
            "{}▶ {} running... ({}/{})",
            indent(2),
            start.name,
            start.index + 1,
            start.total
        ));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
        Ok(())
    }

    fn on_complete_benchmark(&mut self, outcome: &BenchmarkOutcome) -> io::Result<()> {
        self.clear_spinner();

        if outcome.before_each.is_passed() {
            let line = self.benchmark_line(outcome);
            writeln!(self.out, "{line}")?;
        } else {
            let what = format!("Before each hook for {}", outcome.name);
            self.hook_failure(&outcome.before_each, &what)?;
        }

        let what = format!("After each hook for {}", outcome.name);
        self.hook_failure(&outcome.after_each, &what)
    }

    fn on_complete_suite(&mut self, outcome: &SuiteOutcome) -> io::Result<()> {
        self.clear_spinner();
        self.hook_failure(&outcome.after, "After hook")?;

        let failed = outcome.is_failed();
        let mut line = match (outcome.is_comparison(), failed) {
            (true, false) => format!("{}Compare: {} completed in", indent(2), outcome.name),
            (true, true) => format!("{}Compare: {} failed in", indent(2), outcome.name),
            (false, false) => format!("{}Suite: {} passed in", indent(2), outcome.name),
            (false, true) => format!("{}Suite: {} failed in", indent(2), outcome.name),
        };
        line.push_str(&format!(" {}s", outcome.elapsed_secs));

        if let Some(ranking) = &outcome.ranking {
            line.push_str(&format!(
                ", {} was fastest by {}%",
                ranking.fastest,
                format_number(ranking.percentage_difference)
            ));
        }
        writeln!(self.out, "{line}")
    }

    fn on_complete(&mut self, summary: &RunSummary, errors: &[ErrorRecord]) -> io::Result<()> {
        self.clear_spinner();

        writeln!(self.out)?;
        writeln!(
            self.out,
            "{}{} passing ({}s)",
            indent(1),
            summary.passing,
            round_secs(summary.suites_secs)
        )?;
        if summary.failing > 0 {
            writeln!(self.out, "{}{} failing", indent(1), summary.failing)?;
        }

        for (i, record) in errors.iter().enumerate() {
            writeln!(self.out)?;
            writeln!(self.out, "{}{}) {}", indent(1), i + 1, record.suite_name)?;
            writeln!(self.out, "{}{}", indent(2), record.benchmark_name)?;
            writeln!(self.out, "{}{}", indent(3), record.message)?;
            for cause in &record.stack {
                writeln!(self.out, "{}  caused by: {}", indent(3), cause)?;
            }
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use suitebench_core::{BenchStats, ErrorKind, HookStage, SuiteKind, Times};
    use suitebench_stats::{Delta, rank};

    fn bench(name: &str, hz: f64) -> BenchmarkOutcome {
        BenchmarkOutcome {
            suite: "strings".to_string(),
            name: name.to_string(),
            stats: BenchStats {
                hz,
                cycles: 5,
                count: 100,
                times: Times {
                    elapsed: 1.5,
                    ..Times::default()
                },
            },
            classification: Classification::NoBaseline,
            before_each: Checkpoint::Passed,
            after_each: Checkpoint::Passed,
            error: None,
            error_number: None,
        }
    }

    fn output(reporter: SpecReporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_benchmark_lines() {
        let mut reporter = SpecReporter::new(Vec::new());

        let mut slow = bench("concat", 96_000.0);
        slow.classification = Classification::Regression(Delta {
            difference: 4000.0,
            percentage_difference: 4.0,
        });
        slow.error = Some("Regression error: 4% slower than baseline".to_string());
        slow.error_number = Some(1);
        reporter.on_complete_benchmark(&slow).unwrap();

        let mut fast = bench("join", 1234.5);
        fast.classification = Classification::Improvement(Delta {
            difference: 40.0,
            percentage_difference: 3.24,
        });
        reporter.on_complete_benchmark(&fast).unwrap();

        let text = output(reporter);
        assert!(text.contains("1) concat 1.5s (96,000 ops/sec) ✗ 4% slower"));
        assert!(text.contains("✓ join 1.5s (1,235 ops/sec) ✓ 3.24% faster"));
    }

    #[test]
    fn test_hook_failures_are_numbered() {
        let mut reporter = SpecReporter::new(Vec::new());
        let mut outcome = bench("parse", 10.0);
        outcome.before_each = Checkpoint::HookFailed {
            stage: HookStage::BeforeEach,
            error_number: 2,
            message: "fixture missing".to_string(),
        };
        outcome.after_each = Checkpoint::HookFailed {
            stage: HookStage::AfterEach,
            error_number: 3,
            message: "cleanup failed".to_string(),
        };
        reporter.on_complete_benchmark(&outcome).unwrap();

        let text = output(reporter);
        assert!(text.contains("2) Before each hook for parse: fixture missing"));
        assert!(text.contains("3) After each hook for parse: cleanup failed"));
        assert!(!text.contains("ops/sec"));
    }

    #[test]
    fn test_comparison_summary() {
        let mut reporter = SpecReporter::new(Vec::new());
        let benchmarks = vec![bench("regex", 800.0), bench("find", 1000.0)];
        let ranking = rank(benchmarks.iter().map(|b| (b.name.as_str(), b.stats.hz)));
        let suite = SuiteOutcome {
            name: "search".to_string(),
            kind: SuiteKind::Comparison,
            before: Checkpoint::Passed,
            after: Checkpoint::Passed,
            benchmarks,
            elapsed_secs: 3.0,
            ranking,
        };
        reporter.on_complete_suite(&suite).unwrap();

        let text = output(reporter);
        assert!(text.contains("Compare: search completed in 3s, find was fastest by 20%"));
    }

    #[test]
    fn test_comparison_without_passing_benchmarks() {
        let mut reporter = SpecReporter::new(Vec::new());
        let mut broken = bench("regex", 800.0);
        broken.error = Some("invalid pattern".to_string());
        broken.error_number = Some(1);
        let suite = SuiteOutcome {
            name: "search".to_string(),
            kind: SuiteKind::Comparison,
            before: Checkpoint::Passed,
            after: Checkpoint::Passed,
            benchmarks: vec![broken],
            elapsed_secs: 1.5,
            ranking: None,
        };
        reporter.on_complete_suite(&suite).unwrap();

        let text = output(reporter);
        assert!(text.contains("Compare: search failed in 1.5s"));
        assert!(!text.contains("Suite:"));
        assert!(!text.contains("fastest"));
    }

    #[test]
    fn test_final_summary_lists_errors() {
        let mut reporter = SpecReporter::new(Vec::new());
        let summary = RunSummary {
            tag: "v1".to_string(),
            started_at: Utc::now(),
            suites_run: 1,
            suites_skipped: 0,
            passing: 3,
            failing: 1,
            suites_secs: 4.5,
            total_secs: 5.0,
        };
        let errors = vec![ErrorRecord {
            suite_name: "io".to_string(),
            benchmark_name: "before hook".to_string(),
            kind: ErrorKind::Hook(HookStage::Before),
            message: "could not open fixture".to_string(),
            stack: vec!["disk full".to_string()],
        }];
        reporter.on_complete(&summary, &errors).unwrap();

        let text = output(reporter);
        assert!(text.contains("3 passing (4.5s)"));
        assert!(text.contains("1 failing"));
        assert!(text.contains("1) io"));
        assert!(text.contains("before hook"));
        assert!(text.contains("caused by: disk full"));
    }
}
