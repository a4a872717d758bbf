//! Async Hooks: Tokio runtime integration
//!
//! Hooks may be async. `Hook::from_async` drives the future to completion on
//! a current-thread Tokio runtime before the next hook starts, so fixtures
//! prepared asynchronously are always ready when the benchmark runs.
//!
//! Run with: cargo run --example feature_async -p suitebench-demos --release

use std::cell::RefCell;
use std::hint::black_box;
use std::rc::Rc;
use std::time::Duration;
use suitebench::prelude::*;

/// Simulated remote fetch of a fixture
async fn fetch_payload(size: usize) -> anyhow::Result<Vec<u8>> {
    tokio::time::sleep(Duration::from_millis(20)).await;
    Ok((0..size).map(|i| (i % 251) as u8).collect())
}

fn main() -> anyhow::Result<RunOutcome> {
    let mut registry = Registry::new();
    let payload: Rc<RefCell<Vec<u8>>> = Rc::default();

    // ---------------------------------------------------------------------------
    // Fixture loaded once per suite by an async before hook
    // ---------------------------------------------------------------------------

    {
        let payload = payload.clone();
        registry.suite("checksum", move |s| {
            let fixture = payload.clone();
            s.before(Hook::from_async(move || {
                let fixture = fixture.clone();
                async move {
                    let bytes = fetch_payload(64 * 1024).await?;
                    *fixture.borrow_mut() = bytes;
                    Ok::<_, anyhow::Error>(())
                }
            }));

            let fixture = payload.clone();
            s.after(move || {
                fixture.borrow_mut().clear();
                Ok(())
            });

            let bytes = payload.clone();
            s.bench("wrapping sum", move || {
                let sum = bytes
                    .borrow()
                    .iter()
                    .fold(0u32, |acc, b| acc.wrapping_add(u32::from(*b)));
                black_box(sum) > 0
            });

            let bytes = payload;
            s.bench("xor fold", move || {
                let x = bytes.borrow().iter().fold(0u8, |acc, b| acc ^ b);
                black_box(x) < u8::MAX
            });
        });
    }

    // ---------------------------------------------------------------------------
    // Per-benchmark async setup
    // ---------------------------------------------------------------------------

    registry.suite("timers", |s| {
        s.before_each(Hook::from_async(|| async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            Ok::<_, anyhow::Error>(())
        }));
        s.bench("Instant::now", || {
            black_box(std::time::Instant::now()).elapsed() < Duration::MAX
        });
    });

    suitebench::run(registry)
}
