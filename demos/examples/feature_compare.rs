//! Comparisons, Only & Skip
//!
//! `compare` declares a suite whose benchmarks are ranked by ops/sec once
//! they all finish; the completion line names the fastest and its margin
//! over the runner-up. `*_only` variants focus a run on a few suites,
//! `*_skip` variants park suites without deleting them.
//!
//! Run with: cargo run --example feature_compare -p suitebench-demos --release
//!
//! Try also:
//!   ... -- "string"          # only suites whose name matches the regex
//!   ... -- list              # show which suites would run
//!   ... -- --reporter json   # machine-readable output

use std::fmt::Write;
use std::hint::black_box;
use suitebench::prelude::*;

fn main() -> anyhow::Result<RunOutcome> {
    let mut registry = Registry::new();

    // ========================================================================
    // Comparison: three ways to build the same string
    // ========================================================================

    registry.compare("string building", |s| {
        s.bench("format! + push_str", || {
            let mut out = String::new();
            for i in 0..200 {
                out.push_str(&format!("{i},"));
            }
            black_box(out).is_empty()
        });
        s.bench("write!", || -> std::fmt::Result {
            let mut out = String::with_capacity(1024);
            for i in 0..200 {
                write!(out, "{i},")?;
            }
            black_box(out);
            Ok(())
        });
        s.bench("collect + join", || {
            let out = (0..200)
                .map(|i: u32| i.to_string())
                .collect::<Vec<_>>()
                .join(",");
            black_box(out).is_empty()
        });
    });

    // ========================================================================
    // Comparison: sum a vector
    // ========================================================================

    let data: Vec<u64> = (0..10_000).collect();
    {
        let data = data.clone();
        registry.compare("vector sum", move |s| {
            let by_iter = data.clone();
            s.bench("iter().sum()", move || black_box(by_iter.iter().sum::<u64>()) > 0);
            let by_loop = data;
            s.bench("indexed loop", move || {
                let mut sum = 0u64;
                for i in 0..by_loop.len() {
                    sum += by_loop[i];
                }
                black_box(sum) > 0
            });
        });
    }

    // ========================================================================
    // Parked while the allocator work is in progress
    // ========================================================================

    registry.suite_skip("allocation heavy", move |s| {
        s.bench("Vec::with_capacity", move || {
            black_box(Vec::<u64>::with_capacity(data.len())).is_empty()
        });
    });

    // An empty suite never runs, not even its hooks
    registry.suite("placeholder", |s| {
        s.before(|| anyhow::bail!("never called"));
    });

    suitebench::run(registry)
}
