//! Comparison-suite ranking by rate.

use crate::classify::round3;
use serde::Serialize;

/// Ranking of a comparison suite's benchmarks, fastest first
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranking {
    /// Benchmark names ordered by descending rate
    pub order: Vec<String>,
    /// Fastest benchmark
    pub fastest: String,
    /// Second fastest (the fastest itself when the suite has one benchmark)
    pub runner_up: String,
    /// Rate difference between the two, in operations per second
    pub difference: f64,
    /// `difference / fastest * 100`, rounded to three decimals
    pub percentage_difference: f64,
}

/// Rank `(name, hz)` entries. Returns `None` when there are no entries.
///
/// Ties keep declaration order.
pub fn rank<'a, I>(entries: I) -> Option<Ranking>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut sorted: Vec<(&str, f64)> = entries.into_iter().collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (fastest, fastest_hz) = *sorted.first()?;
    let (runner_up, runner_up_hz) = sorted.get(1).copied().unwrap_or((fastest, fastest_hz));

    let difference = fastest_hz - runner_up_hz;
    let percentage_difference = if fastest_hz > 0.0 {
        round3(difference / fastest_hz * 100.0)
    } else {
        0.0
    };

    Some(Ranking {
        order: sorted.iter().map(|(name, _)| name.to_string()).collect(),
        fastest: fastest.to_string(),
        runner_up: runner_up.to_string(),
        difference,
        percentage_difference,
    })
}
