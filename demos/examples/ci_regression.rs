//! CI Regression Pipeline Example
//!
//! Shows how to use SuiteBench in a CI pipeline with run history and tags.
//!
//! Every invocation records one run under the active tag in
//! `bench/.suitebench.json`. A benchmark more than `--error-margin` percent
//! slower than its baseline is a regression: it fails the run (exit 1) and
//! the faster baseline stays on record, so a slow commit cannot lower the bar.
//!
//! Workflow:
//!   # On main, record the current commit:
//!   cargo run --example ci_regression -p suitebench-demos --release
//!
//!   # On a PR branch, compare against the newest recorded run:
//!   cargo run --example ci_regression -p suitebench-demos --release -- --error-margin 5
//!
//!   # Only compare against earlier runs of the same tag:
//!   cargo run --example ci_regression -p suitebench-demos --release -- -t v1.2.0 --baseline-scope same-tag
//!
//!   # Accept an expected slowdown and lower the baseline:
//!   cargo run --example ci_regression -p suitebench-demos --release -- --allow-regressions
//!
//! Tags: `git` (commit hash, default), `version` (Cargo.toml), `date`
//! (formatted with `-T`), or any literal.

use std::collections::HashMap;
use std::hint::black_box;
use suitebench::prelude::*;

fn main() -> anyhow::Result<RunOutcome> {
    let mut registry = Registry::new();

    // ========================================================================
    // Hot-path benchmarks guarding critical performance
    // ========================================================================

    registry.suite("hot path", |s| {
        // Simulated request handler: parse input, look up cache, format response.
        let cache: HashMap<u32, String> = (0..100).map(|i| (i, format!("value_{i}"))).collect();
        s.bench("request handler", move || -> anyhow::Result<String> {
            let key: u32 = black_box("42").parse()?;
            let val = cache.get(&key).map(|s| s.as_str()).unwrap_or("miss");
            Ok(format!("{{\"result\":\"{val}\"}}"))
        });

        // Token scanning: lexer inner loop.
        let source = "fn main() { let x = 42 + y * (z - 1); println!(\"hello\"); }".repeat(100);
        s.bench("token scan", move || {
            let tokens = source
                .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
                .filter(|s| !s.is_empty())
                .count();
            black_box(tokens) > 0
        });

        // Batch processing: bulk data transform.
        let data: Vec<f64> = (0..10_000).map(|i| i as f64 * 0.001).collect();
        s.bench("batch transform", move || {
            let result: Vec<f64> = data.iter().map(|x| (x * 2.0 + 1.0).sqrt()).collect();
            black_box(result.len()) > 0
        });
    });

    // ========================================================================
    // Cold-path benchmarks
    // ========================================================================

    registry.suite("cold path", |s| {
        // Config file parsing (runs once at startup, not latency-critical).
        let config_text: String = (0..50)
            .map(|i| format!("setting_{i} = {}\n", i * 7))
            .collect();
        s.bench("config parse", move || {
            let entries = config_text
                .lines()
                .filter_map(|line| line.split_once(" = "))
                .count();
            black_box(entries) == 50
        });
    });

    let outcome = suitebench::run(registry)?;
    if !outcome.is_success() {
        eprintln!(
            "{} failure(s) recorded; rerun with --allow-regressions to accept slowdowns",
            outcome.errors.len()
        );
    }
    Ok(outcome)
}
