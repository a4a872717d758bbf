#![warn(missing_docs)]
//! Suitebench Core - Suite Model
//!
//! This crate provides the building blocks every other suitebench crate uses:
//! - `Registry` and `SuiteBuilder` for declaring suites, hooks and benchmarks
//! - `SuiteFilter` for only/skip/pattern eligibility
//! - `HookSet` with identity-based deduplication
//! - The error taxonomy and the run's `ErrorLog`
//! - `TimingEngine` and the default `CycleEngine`

mod engine;
mod error;
mod guard;
mod hooks;
mod registry;
mod suite;

pub use engine::{CycleEngine, CycleHooks, EngineConfig, EngineReport, NoCycleHooks, TimingEngine};
pub use error::{ErrorKind, ErrorLog, ErrorRecord, HookStage, SuiteError};
pub use guard::guarded;
pub use hooks::{Checkpoint, Hook, HookContext, HookResult, HookSet, IntoHook, SuiteHooks};
pub use registry::{
    BenchOutput, Eligibility, Registry, SkipReason, SuiteBuilder, SuiteFilter,
};
pub use suite::{BenchFn, BenchStats, Benchmark, Suite, SuiteKind, Times};
