//! Hooks and Hook Sets
//!
//! A [`Hook`] is a shared callback bound to a lifecycle checkpoint. Hooks are
//! compared by identity: cloning a `Hook` yields the same hook, and a
//! [`HookSet`] ignores a hook it already contains.
//!
//! ```ignore
//! let reset = Hook::new(|| {
//!     cache.clear();
//!     Ok(())
//! });
//! s.before_each(reset.clone());
//! s.before_each(reset); // no-op, already registered
//! ```
//!
//! Hooks built with [`Hook::with_context`] also see where they run:
//!
//! ```ignore
//! s.after_cycle(Hook::with_context(|ctx| {
//!     tracing::trace!(benchmark = ?ctx.benchmark, cycle = ?ctx.cycle, "cycle done");
//!     Ok(())
//! }));
//! ```

use crate::error::HookStage;
use crate::guard::guarded;
use fxhash::FxHashSet;
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

/// Result type returned by every hook
pub type HookResult = anyhow::Result<()>;

/// Where a checkpoint is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookContext<'a> {
    /// Suite being run
    pub suite: &'a str,
    /// Benchmark being run; `None` for `before`/`after`
    pub benchmark: Option<&'a str>,
    /// Zero-based measured cycle; set for `beforeCycle`/`afterCycle` only
    pub cycle: Option<u64>,
}

impl<'a> HookContext<'a> {
    /// Context of a suite-level checkpoint
    pub fn suite(suite: &'a str) -> Self {
        Self {
            suite,
            benchmark: None,
            cycle: None,
        }
    }

    /// Narrow to one benchmark
    pub fn benchmark(self, benchmark: &'a str) -> Self {
        Self {
            benchmark: Some(benchmark),
            ..self
        }
    }

    /// Narrow to one measured cycle
    pub fn cycle(self, cycle: u64) -> Self {
        Self {
            cycle: Some(cycle),
            ..self
        }
    }
}

type HookFn = dyn Fn(&HookContext<'_>) -> HookResult;

/// A lifecycle callback with identity semantics
#[derive(Clone)]
pub struct Hook(Rc<HookFn>);

impl Hook {
    /// Wrap a synchronous callback
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> HookResult + 'static,
    {
        Self::with_context(move |_| f())
    }

    /// Wrap a callback that receives the checkpoint's [`HookContext`]
    pub fn with_context<F>(f: F) -> Self
    where
        F: Fn(&HookContext<'_>) -> HookResult + 'static,
    {
        Self(Rc::new(f))
    }

    /// Wrap an async callback.
    ///
    /// The future is driven to completion on a current-thread runtime before
    /// the hook returns, so the next hook never starts early.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = HookResult>,
    {
        Self::new(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(f())
        })
    }

    /// Run the hook, converting a panic into an error
    pub fn call(&self, context: &HookContext<'_>) -> HookResult {
        guarded(|| (self.0)(context))
    }

    fn key(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook({:#x})", self.key())
    }
}

/// Conversion into a [`Hook`], implemented for hooks and plain closures
pub trait IntoHook {
    /// Perform the conversion
    fn into_hook(self) -> Hook;
}

impl IntoHook for Hook {
    fn into_hook(self) -> Hook {
        self
    }
}

impl<F> IntoHook for F
where
    F: Fn() -> HookResult + 'static,
{
    fn into_hook(self) -> Hook {
        Hook::new(self)
    }
}

/// Insertion-ordered set of hooks
#[derive(Clone, Default)]
pub struct HookSet {
    hooks: Vec<Hook>,
    index: FxHashSet<usize>,
}

impl HookSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook; returns `false` if it was already present
    pub fn insert(&mut self, hook: Hook) -> bool {
        if !self.index.insert(hook.key()) {
            return false;
        }
        self.hooks.push(hook);
        true
    }

    /// Whether the set holds this exact hook
    pub fn contains(&self, hook: &Hook) -> bool {
        self.index.contains(&hook.key())
    }

    /// Number of hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Hooks in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Hook> {
        self.hooks.iter()
    }

    /// Run every hook in insertion order, stopping at the first failure
    pub fn run(&self, context: &HookContext<'_>) -> HookResult {
        for hook in &self.hooks {
            hook.call(context)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.hooks.iter()).finish()
    }
}

/// The six hook sets of a suite
#[derive(Debug, Clone, Default)]
pub struct SuiteHooks {
    /// Runs once before the first benchmark
    pub before: HookSet,
    /// Runs once after the last benchmark, on every exit path
    pub after: HookSet,
    /// Runs before every benchmark
    pub before_each: HookSet,
    /// Runs after every benchmark
    pub after_each: HookSet,
    /// Runs before every measured cycle
    pub before_cycle: HookSet,
    /// Runs after every measured cycle
    pub after_cycle: HookSet,
}

impl SuiteHooks {
    /// Hook set bound to a stage
    pub fn get(&self, stage: HookStage) -> &HookSet {
        match stage {
            HookStage::Before => &self.before,
            HookStage::After => &self.after,
            HookStage::BeforeEach => &self.before_each,
            HookStage::AfterEach => &self.after_each,
            HookStage::BeforeCycle => &self.before_cycle,
            HookStage::AfterCycle => &self.after_cycle,
        }
    }

    pub(crate) fn get_mut(&mut self, stage: HookStage) -> &mut HookSet {
        match stage {
            HookStage::Before => &mut self.before,
            HookStage::After => &mut self.after,
            HookStage::BeforeEach => &mut self.before_each,
            HookStage::AfterEach => &mut self.after_each,
            HookStage::BeforeCycle => &mut self.before_cycle,
            HookStage::AfterCycle => &mut self.after_cycle,
        }
    }
}

/// Outcome of running one checkpoint's hook set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Checkpoint {
    /// Every hook succeeded (or there were none)
    Passed,
    /// A hook failed; later hooks in the same set did not run
    HookFailed {
        /// Checkpoint that failed
        stage: HookStage,
        /// Position of the failure in the run's error log
        #[serde(rename = "errorNumber")]
        error_number: usize,
        /// Failure message
        message: String,
    },
}

impl Checkpoint {
    /// Whether the checkpoint passed
    pub fn is_passed(&self) -> bool {
        matches!(self, Checkpoint::Passed)
    }

    /// Error number of the failure, if any
    pub fn error_number(&self) -> Option<usize> {
        match self {
            Checkpoint::Passed => None,
            Checkpoint::HookFailed { error_number, .. } => Some(*error_number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Hook) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log_for_hooks = log.clone();
        let make = move |name: &'static str| {
            let log = log_for_hooks.clone();
            Hook::new(move || {
                log.borrow_mut().push(name);
                Ok(())
            })
        };
        (log, make)
    }

    #[test]
    fn test_runs_in_insertion_order() {
        let (log, make) = recorder();
        let mut set = HookSet::new();
        set.insert(make("c"));
        set.insert(make("a"));
        set.insert(make("b"));

        set.run(&HookContext::suite("s")).unwrap();
        assert_eq!(*log.borrow(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let (log, make) = recorder();
        let hook = make("once");
        let mut set = HookSet::new();

        assert!(set.insert(hook.clone()));
        assert!(!set.insert(hook.clone()));
        assert_eq!(set.len(), 1);
        assert!(set.contains(&hook));

        set.run(&HookContext::suite("s")).unwrap();
        assert_eq!(*log.borrow(), vec!["once"]);
    }

    #[test]
    fn test_stops_at_first_failure() {
        let (log, make) = recorder();
        let mut set = HookSet::new();
        set.insert(make("first"));
        set.insert(Hook::new(|| Err(anyhow::anyhow!("broken fixture"))));
        set.insert(make("never"));

        let err = set.run(&HookContext::suite("s")).unwrap_err();
        assert_eq!(err.to_string(), "broken fixture");
        assert_eq!(*log.borrow(), vec!["first"]);
    }

    #[test]
    fn test_panicking_hook_is_contained() {
        let hook = Hook::new(|| panic!("hook exploded"));
        let err = hook.call(&HookContext::suite("s")).unwrap_err();
        assert!(err.to_string().contains("hook exploded"));
    }

    #[test]
    fn test_context_hook_sees_checkpoint() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let hook = Hook::with_context(move |ctx| {
            let entry = format!("{}/{:?}/{:?}", ctx.suite, ctx.benchmark, ctx.cycle);
            log.borrow_mut().push(entry);
            Ok(())
        });

        hook.call(&HookContext::suite("io")).unwrap();
        hook.call(&HookContext::suite("io").benchmark("read").cycle(3)).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec!["io/None/None".to_string(), "io/Some(\"read\")/Some(3)".to_string()]
        );
    }

    #[test]
    fn test_async_hook_completes_before_returning() {
        let done = Rc::new(RefCell::new(false));
        let flag = done.clone();
        let hook = Hook::from_async(move || {
            let flag = flag.clone();
            async move {
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                *flag.borrow_mut() = true;
                Ok(())
            }
        });

        hook.call(&HookContext::suite("s")).unwrap();
        assert!(*done.borrow());
    }
}
