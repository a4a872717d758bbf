//! Lifecycle Hooks & Failure Containment
//!
//! Six hook stages surround every benchmark:
//!
//!   before        once, before the suite's first benchmark
//!   beforeEach    before every benchmark
//!   beforeCycle   before every measured cycle
//!   afterCycle    after every measured cycle
//!   afterEach     after every benchmark, even a failed one
//!   after         once, after the suite, even if `before` failed
//!
//! A failing or panicking hook or body is recorded with a number and the run
//! moves on; the process exits nonzero at the end if anything failed.
//!
//! Run with: cargo run --example feature_hooks -p suitebench-demos --release
//!
//! Expected output:
//!   - `pool` runs normally, its hooks resetting the pool between cycles
//!   - `broken fixture` reports its before hook failure and runs no benchmarks
//!   - `flaky` reports the panicking and erroring benchmarks; `still fine` passes
//!   - Exit status 1 (failures present)

use std::cell::{Cell, RefCell};
use std::hint::black_box;
use std::rc::Rc;
use suitebench::prelude::*;

fn main() -> anyhow::Result<RunOutcome> {
    let mut registry = Registry::new();

    // ---------------------------------------------------------------------------
    // Every stage, used for fixture management
    // ---------------------------------------------------------------------------

    registry.suite("pool", |s| {
        let pool: Rc<RefCell<Vec<Vec<u8>>>> = Rc::default();
        let cycles = Rc::new(Cell::new(0u64));

        let p = pool.clone();
        s.before(move || {
            p.borrow_mut().extend((0..64).map(|_| Vec::with_capacity(4096)));
            Ok(())
        });

        let c = cycles.clone();
        s.before_each(move || {
            c.set(0);
            Ok(())
        });

        let p = pool.clone();
        s.before_cycle(move || {
            for buf in p.borrow_mut().iter_mut() {
                buf.clear();
            }
            Ok(())
        });

        // Context-aware hooks see the suite, benchmark and cycle index
        let c = cycles.clone();
        s.after_cycle(Hook::with_context(move |ctx| {
            c.set(ctx.cycle.map_or(0, |n| n + 1));
            Ok(())
        }));

        let c = cycles;
        s.after_each(move || {
            anyhow::ensure!(c.get() > 0, "no cycle completed");
            Ok(())
        });

        let p = pool.clone();
        s.after(move || {
            p.borrow_mut().clear();
            Ok(())
        });

        let p = pool.clone();
        s.bench("fill buffer", move || {
            let mut pool = p.borrow_mut();
            if let Some(buf) = pool.first_mut() {
                buf.clear();
                buf.extend(std::iter::repeat_n(7u8, 1024));
            }
            black_box(pool.len()) > 0
        });

        let p = pool;
        s.bench("checksum pool", move || {
            let sum: usize = p.borrow().iter().map(Vec::len).sum();
            black_box(sum) < usize::MAX
        });
    });

    // ---------------------------------------------------------------------------
    // A failing before hook skips the benchmarks but still runs `after`
    // ---------------------------------------------------------------------------

    registry.suite("broken fixture", |s| {
        s.before(|| {
            std::fs::read_to_string("/nonexistent/fixture.json")
                .map(drop)
                .map_err(|e| anyhow::anyhow!(e).context("loading fixture.json"))
        });
        s.after(|| {
            eprintln!("after hook ran despite the failed before hook");
            Ok(())
        });
        s.bench("never measured", || ());
    });

    // ---------------------------------------------------------------------------
    // Failing bodies are contained; the rest of the suite continues
    // ---------------------------------------------------------------------------

    registry.suite("flaky", |s| {
        let calls = Rc::new(Cell::new(0u32));
        let c = calls.clone();
        s.bench("panics after warmup", move || {
            let n = c.get();
            c.set(n + 1);
            if n >= 5 {
                panic!("Intentional panic after {n} iterations!");
            }
            black_box(n) < u32::MAX
        });
        s.bench("returns an error", || -> anyhow::Result<()> {
            let parsed: u32 = black_box("not a number").parse()?;
            black_box(parsed);
            Ok(())
        });
        s.bench("still fine", || black_box(99u64.wrapping_add(1)) == 100);
    });

    suitebench::run(registry)
}
