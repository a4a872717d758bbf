//! Run records and baseline scope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use suitebench_core::BenchStats;

/// Benchmark name → stats
pub type SuiteStats = BTreeMap<String, BenchStats>;

/// Snapshot of every completed benchmark of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Tag identifying the run (commit, version, date or custom)
    pub tag: String,
    /// When the record was created
    pub timestamp: DateTime<Utc>,
    /// Suite name → benchmark name → stats
    pub suites: BTreeMap<String, SuiteStats>,
}

impl RunRecord {
    /// Empty record stamped now
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            timestamp: Utc::now(),
            suites: BTreeMap::new(),
        }
    }

    /// Stats recorded for a suite+benchmark pair
    pub fn get(&self, suite: &str, benchmark: &str) -> Option<&BenchStats> {
        self.suites.get(suite)?.get(benchmark)
    }

    /// Record stats for a suite+benchmark pair
    pub fn insert(&mut self, suite: &str, benchmark: &str, stats: BenchStats) {
        self.suites
            .entry(suite.to_string())
            .or_default()
            .insert(benchmark.to_string(), stats);
    }
}

/// Which records a baseline lookup may use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaselineScope {
    /// Most recent record under any tag
    #[default]
    AnyTag,
    /// Most recent record under the active tag only
    SameTag,
}

impl fmt::Display for BaselineScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaselineScope::AnyTag => write!(f, "any-tag"),
            BaselineScope::SameTag => write!(f, "same-tag"),
        }
    }
}

impl FromStr for BaselineScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any-tag" | "any" => Ok(BaselineScope::AnyTag),
            "same-tag" | "same" => Ok(BaselineScope::SameTag),
            other => Err(format!(
                "unknown baseline scope '{other}' (expected any-tag or same-tag)"
            )),
        }
    }
}
