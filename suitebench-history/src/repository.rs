//! Run Repositories
//!
//! The [`Repository`] trait is the only writer of the run history and the
//! active tag. Two backends:
//!
//! - [`MemoryRepository`]: history lives only for the current process
//! - [`FileRepository`]: pretty JSON array on disk, newest record first
//!
//! Loading a file that does not exist yields an empty history and creates the
//! file. Unparsable content (or JSON that is not an array) also yields an
//! empty history, with a warning. Any other I/O failure is fatal.

use crate::error::{HistoryError, Result};
use crate::history::RunHistory;
use crate::record::{BaselineScope, RunRecord};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use suitebench_core::{BenchStats, Suite};

/// Default location of the history file
pub const DEFAULT_HISTORY_FILE: &str = "bench/.suitebench.json";

/// Persistent store of run records under an active tag
pub trait Repository {
    /// Tag of the current run
    fn tag(&self) -> &str;

    /// Shared history
    fn history(&self) -> &RunHistory;

    /// Mutable history
    fn history_mut(&mut self) -> &mut RunHistory;

    /// Load persisted history
    fn load(&mut self) -> Result<()>;

    /// Drop older records sharing a tag, then persist
    fn save(&mut self) -> Result<()>;

    /// Records, newest first
    fn runs(&self) -> &[RunRecord] {
        self.history().runs()
    }

    /// Baseline stats for a suite+benchmark pair
    fn previous_run(
        &self,
        suite: &str,
        benchmark: &str,
        scope: BaselineScope,
    ) -> Option<&BenchStats> {
        self.history().previous_run(suite, benchmark, scope, self.tag())
    }

    /// Record this run's completed benchmarks under the active tag
    fn add_run(&mut self, suites: &[Suite], allow_regressions: bool) {
        let tag = self.tag().to_string();
        let record = self.history_mut().add_run(&tag, suites, allow_regressions);
        tracing::info!(
            tag = %record.tag,
            suites = record.suites.len(),
            "recorded run"
        );
    }
}

/// Repository that never touches the disk
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    tag: String,
    history: RunHistory,
}

impl MemoryRepository {
    /// Empty repository with the given active tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            history: RunHistory::new(),
        }
    }

    /// Repository seeded with records, newest first
    pub fn with_runs(tag: impl Into<String>, runs: Vec<RunRecord>) -> Self {
        Self {
            tag: tag.into(),
            history: RunHistory::from_runs(runs),
        }
    }
}

impl Repository for MemoryRepository {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn history(&self) -> &RunHistory {
        &self.history
    }

    fn history_mut(&mut self) -> &mut RunHistory {
        &mut self.history
    }

    fn load(&mut self) -> Result<()> {
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.history.dedupe();
        Ok(())
    }
}

/// Repository backed by a JSON file
#[derive(Debug, Clone)]
pub struct FileRepository {
    path: PathBuf,
    tag: String,
    history: RunHistory,
}

impl FileRepository {
    /// Repository for `path` with the given active tag; nothing is read yet
    pub fn new(path: impl Into<PathBuf>, tag: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            tag: tag.into(),
            history: RunHistory::new(),
        }
    }

    /// History file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, contents: &str) -> Vec<RunRecord> {
        match serde_json::from_str::<Vec<RunRecord>>(contents) {
            Ok(runs) => runs,
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "history file is not a valid run list, starting fresh"
                );
                Vec::new()
            }
        }
    }

    fn write(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self.history.runs())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| HistoryError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json).map_err(|source| HistoryError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &self.path).map_err(|source| HistoryError::Write {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            runs = self.history.len(),
            "history written"
        );
        Ok(())
    }
}

impl Repository for FileRepository {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn history(&self) -> &RunHistory {
        &self.history
    }

    fn history_mut(&mut self) -> &mut RunHistory {
        &mut self.history
    }

    fn load(&mut self) -> Result<()> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                self.history = RunHistory::from_runs(self.parse(&contents));
                tracing::debug!(
                    path = %self.path.display(),
                    runs = self.history.len(),
                    "history loaded"
                );
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no history yet, creating it");
                self.history = RunHistory::new();
                self.write()
            }
            Err(source) => Err(HistoryError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn save(&mut self) -> Result<()> {
        self.history.dedupe();
        self.write()?;
        tracing::info!(
            path = %self.path.display(),
            runs = self.history.len(),
            "history saved"
        );
        Ok(())
    }
}
