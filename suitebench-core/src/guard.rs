//! Panic containment for user callbacks.

use std::panic::{AssertUnwindSafe, catch_unwind};

/// Run a user callback, turning a panic into an error.
///
/// Hooks and benchmark bodies are arbitrary user code; a panic in one of them
/// must be contained at the checkpoint like any returned error.
pub fn guarded<T>(f: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(panic) => {
            let message = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            Err(anyhow::anyhow!("panicked: {message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_results_through() {
        assert_eq!(guarded(|| Ok(7)).unwrap(), 7);
        let err = guarded::<()>(|| Err(anyhow::anyhow!("nope"))).unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_converts_panic() {
        let err = guarded::<()>(|| panic!("boom")).unwrap_err();
        assert_eq!(err.to_string(), "panicked: boom");

        let err = guarded::<()>(|| panic!("{} items", 3)).unwrap_err();
        assert_eq!(err.to_string(), "panicked: 3 items");
    }
}
