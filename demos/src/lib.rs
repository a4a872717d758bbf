//! SuiteBench Demos
//!
//! Runnable demonstrations of every SuiteBench feature. This crate is not
//! published; it exists solely to host examples that depend on `suitebench`.
//!
//! Run any example with:
//! ```sh
//! cargo run --example <name> -p suitebench-demos --release
//! ```
//!
//! ## Feature Examples
//!
//! | Example | Feature |
//! |---------|---------|
//! | `feature_hooks` | All six hook stages, failure numbering and containment |
//! | `feature_compare` | Comparison suites, `only`/`skip`, name filter, `list` |
//! | `feature_async` | Async hooks driven on a Tokio runtime |
//!
//! ## Use-Case Examples
//!
//! | Example | Scenario |
//! |---------|----------|
//! | `ci_regression` | CI pipeline: run tags, baselines, regression gating |
