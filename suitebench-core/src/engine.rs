//! Timing Engine
//!
//! The orchestrator delegates the actual measurement of a benchmark body to a
//! [`TimingEngine`]. The engine owns the cycle loop and calls back into the
//! orchestrator through [`CycleHooks`] at the start and end of every cycle.
//!
//! The default [`CycleEngine`] works in three phases:
//!
//! ```text
//! warmup       run single operations until warmup_time passes (at least one)
//!   │          → estimate seconds per operation
//!   ▼
//! calibrate    count = operations per cycle so a cycle lasts ~min_cycle_time
//!   ▼
//! measure      before_cycle → `count` operations → after_cycle, repeated until
//!              measurement_time has passed and min_cycles are done,
//!              or max_cycles is reached
//! ```

use crate::error::{HookStage, SuiteError};
use crate::hooks::HookResult;
use crate::suite::{BenchStats, Times};
use chrono::Utc;
use std::time::{Duration, Instant};

/// Checkpoint callbacks the engine triggers around each measured cycle
///
/// `cycle` is the zero-based index of the measured cycle.
pub trait CycleHooks {
    /// Called before a cycle starts
    fn before_cycle(&mut self, cycle: u64) -> HookResult;
    /// Called after a cycle ends
    fn after_cycle(&mut self, cycle: u64) -> HookResult;
}

/// Cycle hooks that do nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCycleHooks;

impl CycleHooks for NoCycleHooks {
    fn before_cycle(&mut self, _cycle: u64) -> HookResult {
        Ok(())
    }

    fn after_cycle(&mut self, _cycle: u64) -> HookResult {
        Ok(())
    }
}

/// What the engine reports for one benchmark
#[derive(Debug, Default)]
pub struct EngineReport {
    /// Measured statistics; `cycles == 0` when nothing completed
    pub stats: BenchStats,
    /// Body or cycle-hook failure that aborted the measurement
    pub error: Option<SuiteError>,
}

impl EngineReport {
    fn failed(error: SuiteError) -> Self {
        Self {
            stats: BenchStats::default(),
            error: Some(error),
        }
    }
}

/// Executes a benchmark body repeatedly and reports its rate
pub trait TimingEngine {
    /// Measure `body`, triggering `hooks` around each cycle
    fn measure(
        &mut self,
        body: &mut dyn FnMut() -> anyhow::Result<()>,
        hooks: &mut dyn CycleHooks,
    ) -> EngineReport;
}

/// Configuration of the default cycle engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// How long to run single operations before measuring
    pub warmup_time: Duration,
    /// Minimum time spent in measured cycles
    pub measurement_time: Duration,
    /// Target duration of one cycle, used to size `count`
    pub min_cycle_time: Duration,
    /// Minimum number of measured cycles
    pub min_cycles: u64,
    /// Hard cap on measured cycles
    pub max_cycles: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            warmup_time: Duration::from_secs(1),
            measurement_time: Duration::from_secs(5),
            min_cycle_time: Duration::from_millis(50),
            min_cycles: 5,
            max_cycles: None,
        }
    }
}

/// Default timing engine: fixed-size cycles of repeated operations
#[derive(Debug, Clone, Default)]
pub struct CycleEngine {
    config: EngineConfig,
}

impl CycleEngine {
    /// Create an engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn operations_per_cycle(&self, seconds_per_op: f64) -> u64 {
        if seconds_per_op <= 0.0 {
            return 1;
        }
        let count = self.config.min_cycle_time.as_secs_f64() / seconds_per_op;
        (count.ceil() as u64).max(1)
    }
}

fn body_error(source: anyhow::Error) -> SuiteError {
    SuiteError::Body { source }
}

fn hook_error(stage: HookStage, source: anyhow::Error) -> SuiteError {
    SuiteError::Hook { stage, source }
}

impl TimingEngine for CycleEngine {
    fn measure(
        &mut self,
        body: &mut dyn FnMut() -> anyhow::Result<()>,
        hooks: &mut dyn CycleHooks,
    ) -> EngineReport {
        let started = Instant::now();
        let time_stamp = Utc::now().timestamp_millis();

        // Warmup: at least one operation so a broken body fails fast
        let mut warmup_ops = 0u64;
        let warmup_start = Instant::now();
        loop {
            if let Err(e) = body() {
                return EngineReport::failed(body_error(e));
            }
            warmup_ops += 1;
            if warmup_start.elapsed() >= self.config.warmup_time {
                break;
            }
        }
        let seconds_per_op = warmup_start.elapsed().as_secs_f64() / warmup_ops as f64;
        let count = self.operations_per_cycle(seconds_per_op);
        tracing::trace!(warmup_ops, count, "calibrated cycle size");

        let max_cycles = self
            .config
            .max_cycles
            .unwrap_or(u64::MAX)
            .max(self.config.min_cycles.max(1));
        let mut cycles = 0u64;
        let mut measured = Duration::ZERO;
        let mut last_cycle = Duration::ZERO;

        loop {
            let min_cycles_met = cycles >= self.config.min_cycles.max(1);
            let time_limit_reached = measured >= self.config.measurement_time;
            if cycles >= max_cycles || (min_cycles_met && time_limit_reached) {
                break;
            }

            if let Err(e) = hooks.before_cycle(cycles) {
                return EngineReport::failed(hook_error(HookStage::BeforeCycle, e));
            }

            let cycle_start = Instant::now();
            for _ in 0..count {
                if let Err(e) = body() {
                    return EngineReport::failed(body_error(e));
                }
            }
            last_cycle = cycle_start.elapsed();

            if let Err(e) = hooks.after_cycle(cycles) {
                return EngineReport::failed(hook_error(HookStage::AfterCycle, e));
            }

            measured += last_cycle;
            cycles += 1;
        }

        let total_ops = (cycles * count) as f64;
        let measured_secs = measured.as_secs_f64();
        let (hz, period) = if measured_secs > 0.0 {
            (total_ops / measured_secs, measured_secs / total_ops)
        } else {
            (0.0, 0.0)
        };

        EngineReport {
            stats: BenchStats {
                hz,
                cycles,
                count,
                times: Times {
                    cycle: last_cycle.as_secs_f64(),
                    elapsed: started.elapsed().as_secs_f64(),
                    period,
                    time_stamp,
                },
            },
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_engine(min_cycles: u64, max_cycles: Option<u64>) -> CycleEngine {
        CycleEngine::new(EngineConfig {
            warmup_time: Duration::ZERO,
            measurement_time: Duration::ZERO,
            min_cycle_time: Duration::from_micros(50),
            min_cycles,
            max_cycles,
        })
    }

    struct CountingHooks {
        before: u64,
        after: u64,
        fail_before_on: Option<u64>,
    }

    impl CycleHooks for CountingHooks {
        fn before_cycle(&mut self, cycle: u64) -> HookResult {
            assert_eq!(cycle, self.before);
            self.before += 1;
            if Some(self.before) == self.fail_before_on {
                anyhow::bail!("cycle fixture broke");
            }
            Ok(())
        }

        fn after_cycle(&mut self, cycle: u64) -> HookResult {
            assert_eq!(cycle, self.after);
            self.after += 1;
            Ok(())
        }
    }

    #[test]
    fn test_runs_min_cycles() {
        let mut engine = quick_engine(4, None);
        let mut hooks = CountingHooks {
            before: 0,
            after: 0,
            fail_before_on: None,
        };
        let mut body = || {
            std::hint::black_box((0..100u64).sum::<u64>());
            Ok(())
        };

        let report = engine.measure(&mut body, &mut hooks);

        assert!(report.error.is_none());
        assert_eq!(report.stats.cycles, 4);
        assert!(report.stats.count >= 1);
        assert!(report.stats.hz > 0.0);
        assert_eq!(hooks.before, 4);
        assert_eq!(hooks.after, 4);
    }

    #[test]
    fn test_max_cycles_caps_run() {
        let mut engine = CycleEngine::new(EngineConfig {
            warmup_time: Duration::ZERO,
            measurement_time: Duration::from_secs(60),
            min_cycle_time: Duration::from_micros(10),
            min_cycles: 1,
            max_cycles: Some(3),
        });
        let report = engine.measure(&mut || Ok(()), &mut NoCycleHooks);

        assert_eq!(report.stats.cycles, 3);
    }

    #[test]
    fn test_body_error_aborts_without_cycles() {
        let mut engine = quick_engine(3, None);
        let mut calls = 0;
        let mut body = || {
            calls += 1;
            if calls > 2 {
                anyhow::bail!("intended error");
            }
            Ok(())
        };

        let report = engine.measure(&mut body, &mut NoCycleHooks);

        assert!(matches!(report.error, Some(SuiteError::Body { .. })));
        assert_eq!(report.stats.cycles, 0);
    }

    #[test]
    fn test_cycle_hook_failure_is_reported() {
        let mut engine = quick_engine(5, None);
        let mut hooks = CountingHooks {
            before: 0,
            after: 0,
            fail_before_on: Some(2),
        };

        let report = engine.measure(&mut || Ok(()), &mut hooks);

        match report.error {
            Some(SuiteError::Hook { stage, .. }) => assert_eq!(stage, HookStage::BeforeCycle),
            other => panic!("expected beforeCycle failure, got {other:?}"),
        }
        assert_eq!(hooks.after, 1);
        assert!(!report.stats.has_completed_cycle());
    }
}
