//! Suite Scheduler
//!
//! Walks the declared suites strictly in declaration order, resolving each
//! one's eligibility at the moment it is reached. The driver runs an eligible
//! suite to completion before calling [`Scheduler::advance`] again, so no two
//! suites ever overlap.

use suitebench_core::{Eligibility, SkipReason, Suite, SuiteFilter};

/// Next thing the driver should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Run the suite at this index
    Run(usize),
    /// The suite at this index does not run
    Skip {
        /// Suite index
        index: usize,
        /// Why it does not run
        reason: SkipReason,
    },
    /// Every suite has been visited
    Exhausted,
}

/// Cursor over the declared suites
#[derive(Debug)]
pub struct Scheduler {
    filter: SuiteFilter,
    cursor: usize,
}

impl Scheduler {
    /// Scheduler starting at the first suite
    pub fn new(filter: SuiteFilter) -> Self {
        Self { filter, cursor: 0 }
    }

    /// Filter in effect
    pub fn filter(&self) -> &SuiteFilter {
        &self.filter
    }

    /// Move to the next suite and decide what to do with it
    pub fn advance(&mut self, suites: &[Suite]) -> Step {
        let Some(suite) = suites.get(self.cursor) else {
            return Step::Exhausted;
        };
        let index = self.cursor;
        self.cursor += 1;

        match self.filter.resolve(suite) {
            Eligibility::Run => Step::Run(index),
            Eligibility::Skip(reason) => Step::Skip { index, reason },
        }
    }

    /// Eligibility of every suite without advancing
    pub fn plan<'s>(&self, suites: &'s [Suite]) -> Vec<(&'s Suite, Eligibility)> {
        suites.iter().map(|s| (s, self.filter.resolve(s))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use suitebench_core::Registry;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.suite("alpha", |s| {
            s.bench("a", || ());
        });
        registry.suite("empty", |_| {});
        registry.suite_skip("beta", |s| {
            s.bench("b", || ());
        });
        registry.compare("gamma", |s| {
            s.bench("c", || ());
        });
        registry
    }

    #[test]
    fn test_steps_in_declaration_order() {
        let (suites, filter) = registry().into_parts();
        let mut scheduler = Scheduler::new(filter);

        assert_eq!(scheduler.advance(&suites), Step::Run(0));
        assert_eq!(
            scheduler.advance(&suites),
            Step::Skip {
                index: 1,
                reason: SkipReason::Empty
            }
        );
        assert_eq!(
            scheduler.advance(&suites),
            Step::Skip {
                index: 2,
                reason: SkipReason::Skipped
            }
        );
        assert_eq!(scheduler.advance(&suites), Step::Run(3));
        assert_eq!(scheduler.advance(&suites), Step::Exhausted);
        assert_eq!(scheduler.advance(&suites), Step::Exhausted);
    }

    #[test]
    fn test_pattern_filter() {
        let (suites, filter) = registry().into_parts();
        let filter = filter.with_pattern(Some(Regex::new("^gam").unwrap()));
        let scheduler = Scheduler::new(filter);

        let runnable: Vec<&str> = scheduler
            .plan(&suites)
            .into_iter()
            .filter(|(_, e)| *e == Eligibility::Run)
            .map(|(s, _)| s.name())
            .collect();
        assert_eq!(runnable, vec!["gamma"]);
    }
}
