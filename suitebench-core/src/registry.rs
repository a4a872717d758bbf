//! Suite Registry
//!
//! Collects suite declarations in order and resolves which of them are
//! eligible to run.
//!
//! Declaration goes through an explicit [`SuiteBuilder`] handed to each
//! suite's setup closure, so hooks and benchmarks can only ever land in the
//! suite being declared:
//!
//! ```ignore
//! let mut registry = Registry::new();
//! registry.suite("parsing", |s| {
//!     s.before(|| load_fixtures());
//!     s.bench("small input", || parse(SMALL));
//! });
//! registry.compare_only("regex vs find", |s| {
//!     s.bench("Regex::is_match", || re.is_match(TEXT));
//!     s.bench("str::find", || TEXT.find("orl").is_some());
//! });
//! ```

use crate::error::HookStage;
use crate::hooks::IntoHook;
use crate::suite::{Benchmark, Suite, SuiteKind};
use regex::Regex;
use std::hint::black_box;

/// Values a benchmark body may return
pub trait BenchOutput {
    /// Convert into the body's result, discarding any value
    fn into_result(self) -> anyhow::Result<()>;
}

impl BenchOutput for () {
    fn into_result(self) -> anyhow::Result<()> {
        Ok(())
    }
}

impl BenchOutput for bool {
    fn into_result(self) -> anyhow::Result<()> {
        black_box(self);
        Ok(())
    }
}

impl<T, E> BenchOutput for Result<T, E>
where
    E: Into<anyhow::Error>,
{
    fn into_result(self) -> anyhow::Result<()> {
        self.map(|value| {
            black_box(value);
        })
        .map_err(Into::into)
    }
}

/// Builder context passed to a suite's setup closure
pub struct SuiteBuilder<'a> {
    suite: &'a mut Suite,
}

impl SuiteBuilder<'_> {
    /// Name of the suite being declared
    pub fn name(&self) -> &str {
        self.suite.name()
    }

    fn hook(&mut self, stage: HookStage, hook: impl IntoHook) -> &mut Self {
        if !self.suite.hooks.get_mut(stage).insert(hook.into_hook()) {
            tracing::debug!(suite = self.suite.name(), %stage, "hook already registered");
        }
        self
    }

    /// Run once before the suite's first benchmark
    pub fn before(&mut self, hook: impl IntoHook) -> &mut Self {
        self.hook(HookStage::Before, hook)
    }

    /// Run once after the suite's last benchmark, even if `before` failed
    pub fn after(&mut self, hook: impl IntoHook) -> &mut Self {
        self.hook(HookStage::After, hook)
    }

    /// Run before every benchmark
    pub fn before_each(&mut self, hook: impl IntoHook) -> &mut Self {
        self.hook(HookStage::BeforeEach, hook)
    }

    /// Run after every benchmark
    pub fn after_each(&mut self, hook: impl IntoHook) -> &mut Self {
        self.hook(HookStage::AfterEach, hook)
    }

    /// Run before every measured cycle
    pub fn before_cycle(&mut self, hook: impl IntoHook) -> &mut Self {
        self.hook(HookStage::BeforeCycle, hook)
    }

    /// Run after every measured cycle
    pub fn after_cycle(&mut self, hook: impl IntoHook) -> &mut Self {
        self.hook(HookStage::AfterCycle, hook)
    }

    /// Declare a benchmark. A name already used in this suite is ignored.
    pub fn bench<F, R>(&mut self, name: impl Into<String>, mut body: F) -> &mut Self
    where
        F: FnMut() -> R + 'static,
        R: BenchOutput,
    {
        let name = name.into();
        if self.suite.benchmarks.iter().any(|b| b.name() == name) {
            tracing::warn!(
                suite = self.suite.name(),
                benchmark = %name,
                "duplicate benchmark name ignored"
            );
            return self;
        }
        self.suite
            .benchmarks
            .push(Benchmark::new(name, Box::new(move || body().into_result())));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    Normal,
    Only,
    Skip,
}

/// Ordered collection of declared suites plus only/skip state
#[derive(Debug, Default)]
pub struct Registry {
    suites: Vec<Suite>,
    only: Vec<String>,
    skip: Vec<String>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a suite
    pub fn suite(
        &mut self,
        name: impl Into<String>,
        setup: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        self.declare(name.into(), SuiteKind::Suite, Selection::Normal, setup)
    }

    /// Declare a suite and restrict the run to `only` suites
    pub fn suite_only(
        &mut self,
        name: impl Into<String>,
        setup: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        self.declare(name.into(), SuiteKind::Suite, Selection::Only, setup)
    }

    /// Declare a suite that is never run
    pub fn suite_skip(
        &mut self,
        name: impl Into<String>,
        setup: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        self.declare(name.into(), SuiteKind::Suite, Selection::Skip, setup)
    }

    /// Declare a comparison suite
    pub fn compare(
        &mut self,
        name: impl Into<String>,
        setup: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        self.declare(name.into(), SuiteKind::Comparison, Selection::Normal, setup)
    }

    /// Declare a comparison suite and restrict the run to `only` suites
    pub fn compare_only(
        &mut self,
        name: impl Into<String>,
        setup: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        self.declare(name.into(), SuiteKind::Comparison, Selection::Only, setup)
    }

    /// Declare a comparison suite that is never run
    pub fn compare_skip(
        &mut self,
        name: impl Into<String>,
        setup: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        self.declare(name.into(), SuiteKind::Comparison, Selection::Skip, setup)
    }

    fn declare(
        &mut self,
        name: String,
        kind: SuiteKind,
        selection: Selection,
        setup: impl FnOnce(&mut SuiteBuilder),
    ) -> &mut Self {
        if self.suites.iter().any(|s| s.name() == name) {
            tracing::warn!(suite = %name, "duplicate suite name ignored");
            return self;
        }

        match selection {
            Selection::Only => self.only.push(name.clone()),
            Selection::Skip => self.skip.push(name.clone()),
            Selection::Normal => {}
        }

        let mut suite = Suite::new(name, kind);
        setup(&mut SuiteBuilder { suite: &mut suite });
        tracing::debug!(
            suite = suite.name(),
            benchmarks = suite.len(),
            "suite declared"
        );
        self.suites.push(suite);
        self
    }

    /// Declared suites in declaration order
    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    /// Names declared with an `only` variant
    pub fn only(&self) -> &[String] {
        &self.only
    }

    /// Names declared with a `skip` variant
    pub fn skipped(&self) -> &[String] {
        &self.skip
    }

    /// Only/skip filter implied by the declarations so far
    pub fn filter(&self) -> SuiteFilter {
        SuiteFilter {
            only: self.only.clone(),
            skip: self.skip.clone(),
            pattern: None,
        }
    }

    /// Freeze the registry: suites in order and the filter to apply to them
    pub fn into_parts(self) -> (Vec<Suite>, SuiteFilter) {
        let filter = SuiteFilter {
            only: self.only,
            skip: self.skip,
            pattern: None,
        };
        (self.suites, filter)
    }
}

/// Why a suite does not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Other suites were declared `only` and this one was not
    NotSelected,
    /// Declared with a `skip` variant
    Skipped,
    /// No benchmarks declared
    Empty,
    /// Name does not match the command-line filter
    FilteredOut,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SkipReason::NotSelected => "not selected by only",
            SkipReason::Skipped => "skipped",
            SkipReason::Empty => "empty",
            SkipReason::FilteredOut => "filtered out",
        };
        f.write_str(reason)
    }
}

/// Whether a suite runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    /// Run the suite's full lifecycle
    Run,
    /// Do not touch the suite at all
    Skip(SkipReason),
}

/// Only/skip resolution, frozen at scheduling time
#[derive(Debug, Clone, Default)]
pub struct SuiteFilter {
    only: Vec<String>,
    skip: Vec<String>,
    pattern: Option<Regex>,
}

impl SuiteFilter {
    /// Additionally require suite names to match `pattern`
    pub fn with_pattern(mut self, pattern: Option<Regex>) -> Self {
        self.pattern = pattern;
        self
    }

    /// Decide whether `suite` runs
    pub fn resolve(&self, suite: &Suite) -> Eligibility {
        let name = suite.name();
        if !self.only.is_empty() && !self.only.iter().any(|n| n == name) {
            return Eligibility::Skip(SkipReason::NotSelected);
        }
        if self.skip.iter().any(|n| n == name) {
            return Eligibility::Skip(SkipReason::Skipped);
        }
        if suite.is_empty() {
            return Eligibility::Skip(SkipReason::Empty);
        }
        if let Some(re) = &self.pattern {
            if !re.is_match(name) {
                return Eligibility::Skip(SkipReason::FilteredOut);
            }
        }
        Eligibility::Run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_bench(s: &mut SuiteBuilder) {
        s.bench("noop", || ());
    }

    fn resolve_all(registry: Registry) -> Vec<(String, Eligibility)> {
        let (suites, filter) = registry.into_parts();
        suites
            .iter()
            .map(|s| (s.name().to_string(), filter.resolve(s)))
            .collect()
    }

    #[test]
    fn test_declaration_order_preserved() {
        let mut registry = Registry::new();
        registry.suite("b", one_bench).compare("a", one_bench).suite("c", one_bench);

        let names: Vec<_> = registry.suites().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
        assert!(registry.suites()[1].is_comparison());
    }

    #[test]
    fn test_only_restricts_run() {
        let mut registry = Registry::new();
        registry
            .suite_only("A", one_bench)
            .suite("B", one_bench)
            .compare("C", one_bench);

        let resolved = resolve_all(registry);
        assert_eq!(resolved[0].1, Eligibility::Run);
        assert_eq!(resolved[1].1, Eligibility::Skip(SkipReason::NotSelected));
        assert_eq!(resolved[2].1, Eligibility::Skip(SkipReason::NotSelected));
    }

    #[test]
    fn test_skip_and_empty() {
        let mut registry = Registry::new();
        registry
            .suite_skip("skipped", one_bench)
            .suite("empty", |_| {})
            .compare_only("empty compare", |_| {})
            .compare_only("kept", one_bench);

        let resolved = resolve_all(registry);
        assert_eq!(resolved[0].1, Eligibility::Skip(SkipReason::NotSelected));
        assert_eq!(resolved[1].1, Eligibility::Skip(SkipReason::NotSelected));
        assert_eq!(resolved[2].1, Eligibility::Skip(SkipReason::Empty));
        assert_eq!(resolved[3].1, Eligibility::Run);
    }

    #[test]
    fn test_skip_without_only() {
        let mut registry = Registry::new();
        registry.suite_skip("skipped", one_bench).suite("kept", one_bench);

        let resolved = resolve_all(registry);
        assert_eq!(resolved[0].1, Eligibility::Skip(SkipReason::Skipped));
        assert_eq!(resolved[1].1, Eligibility::Run);
    }

    #[test]
    fn test_pattern_filter() {
        let mut registry = Registry::new();
        registry.suite("json parse", one_bench).suite("yaml parse", one_bench);
        let (suites, filter) = registry.into_parts();
        let filter = filter.with_pattern(Regex::new("^json").ok());

        assert_eq!(filter.resolve(&suites[0]), Eligibility::Run);
        assert_eq!(
            filter.resolve(&suites[1]),
            Eligibility::Skip(SkipReason::FilteredOut)
        );
    }

    #[test]
    fn test_duplicates_ignored() {
        let mut registry = Registry::new();
        registry.suite("dup", |s| {
            s.bench("x", || ());
            s.bench("x", || ());
            s.bench("y", || ());
        });
        registry.suite("dup", |_| panic!("setup of a duplicate suite must not run"));

        assert_eq!(registry.suites().len(), 1);
        assert_eq!(registry.suites()[0].len(), 2);
    }

    #[test]
    fn test_builder_hooks_land_in_own_suite() {
        let mut registry = Registry::new();
        registry.suite("first", |s| {
            s.before(|| Ok(()));
            s.bench("a", || ());
        });
        registry.suite("second", |s| {
            s.bench("b", || ());
        });

        assert_eq!(registry.suites()[0].hooks().before.len(), 1);
        assert!(registry.suites()[1].hooks().before.is_empty());
    }

    #[test]
    fn test_bench_output_conversions() {
        assert!(().into_result().is_ok());
        assert!(true.into_result().is_ok());
        assert!(Ok::<u32, std::io::Error>(3).into_result().is_ok());
        let err = Err::<(), _>(anyhow::anyhow!("bad")).into_result().unwrap_err();
        assert_eq!(err.to_string(), "bad");
    }
}
