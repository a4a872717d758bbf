//! Run History
//!
//! Most-recent-first list of [`RunRecord`]s with the baseline lookup and the
//! retention ratchet:
//!
//! ```text
//! add_run(tag = T)
//!   for each completed benchmark X:
//!     prev = newest record under T holding X
//!     prev.hz > new.hz && !allow_regressions  →  write prev (baseline kept)
//!     otherwise                               →  write new
//!   insert record at index 0
//! ```

use crate::record::{BaselineScope, RunRecord};
use fxhash::FxHashSet;
use suitebench_core::{BenchStats, Suite};

/// Ordered run history, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunHistory {
    runs: Vec<RunRecord>,
}

impl RunHistory {
    /// Empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// History from records already ordered newest first
    pub fn from_runs(runs: Vec<RunRecord>) -> Self {
        Self { runs }
    }

    /// Records, newest first
    pub fn runs(&self) -> &[RunRecord] {
        &self.runs
    }

    /// Consume into the record list
    pub fn into_runs(self) -> Vec<RunRecord> {
        self.runs
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether there are no records
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Insert a record at the front
    pub fn push_front(&mut self, record: RunRecord) {
        self.runs.insert(0, record);
    }

    /// Newest stats for `suite`/`benchmark`.
    ///
    /// With [`BaselineScope::SameTag`], records under another tag than
    /// `active_tag` are skipped.
    pub fn previous_run(
        &self,
        suite: &str,
        benchmark: &str,
        scope: BaselineScope,
        active_tag: &str,
    ) -> Option<&BenchStats> {
        self.runs
            .iter()
            .filter(|run| scope == BaselineScope::AnyTag || run.tag == active_tag)
            .find_map(|run| run.get(suite, benchmark))
    }

    /// Build a record under `tag` from every benchmark that completed a
    /// cycle and insert it at the front.
    ///
    /// A same-tag baseline faster than the new result is written in place of
    /// the new stats unless `allow_regressions` is set.
    pub fn add_run(&mut self, tag: &str, suites: &[Suite], allow_regressions: bool) -> &RunRecord {
        let mut record = RunRecord::new(tag);

        for suite in suites {
            for benchmark in suite.benchmarks().iter().filter(|b| b.is_completed()) {
                let previous =
                    self.previous_run(suite.name(), benchmark.name(), BaselineScope::SameTag, tag);
                let stats = match previous {
                    Some(prev) if !allow_regressions && prev.hz > benchmark.stats.hz => {
                        tracing::debug!(
                            suite = suite.name(),
                            benchmark = benchmark.name(),
                            previous_hz = prev.hz,
                            hz = benchmark.stats.hz,
                            "keeping faster baseline"
                        );
                        *prev
                    }
                    _ => benchmark.stats,
                };
                record.insert(suite.name(), benchmark.name(), stats);
            }
        }

        self.push_front(record);
        &self.runs[0]
    }

    /// Keep only the first (newest) record of each tag
    pub fn dedupe(&mut self) {
        let mut seen = FxHashSet::default();
        self.runs.retain(|run| seen.insert(run.tag.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use suitebench_core::{Registry, Times};

    fn stats(hz: f64) -> BenchStats {
        BenchStats {
            hz,
            cycles: 5,
            count: 10,
            times: Times {
                cycle: 0.05,
                elapsed: 1.0,
                period: 1.0 / hz,
                time_stamp: 0,
            },
        }
    }

    fn record(tag: &str, hz: f64) -> RunRecord {
        let mut r = RunRecord::new(tag);
        r.insert("math", "sum", stats(hz));
        r
    }

    fn suites_with(hz: f64) -> Vec<Suite> {
        let mut registry = Registry::new();
        registry.suite("math", |s| {
            s.bench("sum", || ());
            s.bench("never ran", || ());
        });
        let (mut suites, _) = registry.into_parts();
        let (_, benchmarks) = suites[0].parts_mut();
        benchmarks[0].stats = stats(hz);
        suites
    }

    #[test]
    fn test_previous_run_scopes() {
        let history = RunHistory::from_runs(vec![record("v2", 90.0), record("v1", 100.0)]);

        let any = history.previous_run("math", "sum", BaselineScope::AnyTag, "v1");
        assert_eq!(any.map(|s| s.hz), Some(90.0));

        let same = history.previous_run("math", "sum", BaselineScope::SameTag, "v1");
        assert_eq!(same.map(|s| s.hz), Some(100.0));

        assert!(history.previous_run("math", "nope", BaselineScope::AnyTag, "v1").is_none());
        assert!(history.previous_run("math", "sum", BaselineScope::SameTag, "v3").is_none());
    }

    #[test]
    fn test_ratchet_keeps_faster_baseline() {
        let mut history = RunHistory::from_runs(vec![record("T", 100.0)]);
        let record = history.add_run("T", &suites_with(96.0), false);

        assert_eq!(record.get("math", "sum").map(|s| s.hz), Some(100.0));
        assert!(record.get("math", "never ran").is_none());
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_allowed_regression_lowers_baseline() {
        let mut history = RunHistory::from_runs(vec![record("T", 100.0)]);
        let record = history.add_run("T", &suites_with(96.0), true);
        assert_eq!(record.get("math", "sum").map(|s| s.hz), Some(96.0));
    }

    #[test]
    fn test_improvement_replaces_baseline() {
        let mut history = RunHistory::from_runs(vec![record("T", 100.0)]);
        let record = history.add_run("T", &suites_with(103.0), false);
        assert_eq!(record.get("math", "sum").map(|s| s.hz), Some(103.0));
    }

    #[test]
    fn test_ratchet_ignores_other_tags() {
        let mut history = RunHistory::from_runs(vec![record("old", 100.0)]);
        let record = history.add_run("new", &suites_with(50.0), false);
        assert_eq!(record.get("math", "sum").map(|s| s.hz), Some(50.0));
    }

    #[test]
    fn test_suite_without_completed_benchmarks_is_omitted() {
        let mut registry = Registry::new();
        registry.suite("idle", |s| {
            s.bench("never ran", || ());
        });
        let (suites, _) = registry.into_parts();

        let mut history = RunHistory::new();
        let record = history.add_run("T", &suites, false);
        assert!(record.suites.is_empty());
    }

    #[test]
    fn test_dedupe_keeps_newest_per_tag() {
        let mut history = RunHistory::new();
        history.push_front(record("v1", 100.0));
        history.push_front(record("v2", 80.0));
        history.push_front(record("v1", 120.0));

        history.dedupe();

        let tags: Vec<&str> = history.runs().iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, vec!["v1", "v2"]);
        assert_eq!(history.runs()[0].get("math", "sum").map(|s| s.hz), Some(120.0));
    }
}
