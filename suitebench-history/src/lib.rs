#![warn(missing_docs)]
//! SuiteBench Run History
//!
//! Persists one [`RunRecord`] per invocation and answers baseline lookups:
//! - `RunHistory`: newest-first records, baseline lookup, retention ratchet, tag dedup
//! - `Repository` with in-memory and JSON-file backends
//! - `TagSource`: git, version, date or custom run tags

mod error;
mod history;
mod record;
mod repository;
mod tag;

pub use error::{HistoryError, Result};
pub use history::RunHistory;
pub use record::{BaselineScope, RunRecord, SuiteStats};
pub use repository::{DEFAULT_HISTORY_FILE, FileRepository, MemoryRepository, Repository};
pub use tag::{DEFAULT_DATE_FORMAT, TagSource};
