//! Run tag resolution.

use crate::error::{HistoryError, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::Utc;
use std::path::Path;

/// Default strftime format of the date tag
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Where the active run tag comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSource {
    /// Current git commit (`git rev-parse HEAD`)
    Git,
    /// `version` of the package manifest in the working directory
    Version,
    /// Today's UTC date
    Date {
        /// strftime format
        format: String,
    },
    /// Literal tag
    Custom(String),
}

impl TagSource {
    /// Interpret a `--tag` value: `git`, `version`, `date`, or anything else
    /// as a literal tag.
    pub fn parse(value: &str, date_format: &str) -> Self {
        match value {
            "git" => TagSource::Git,
            "version" => TagSource::Version,
            "date" => TagSource::Date {
                format: date_format.to_string(),
            },
            other => TagSource::Custom(other.to_string()),
        }
    }

    /// Resolve against the current directory
    pub fn resolve(&self) -> Result<String> {
        self.resolve_in(Path::new("."))
    }

    /// Resolve with `dir` as the working directory
    pub fn resolve_in(&self, dir: &Path) -> Result<String> {
        match self {
            TagSource::Git => git_head(dir),
            TagSource::Version => manifest_version(dir),
            TagSource::Date { format } => today(format),
            TagSource::Custom(tag) => Ok(tag.clone()),
        }
    }
}

fn git_head(dir: &Path) -> Result<String> {
    let tag_error = |reason: String| HistoryError::Tag {
        source_name: "git",
        reason,
    };

    let output = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output()
        .map_err(|e| tag_error(e.to_string()))?;

    if !output.status.success() {
        return Err(tag_error(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    String::from_utf8(output.stdout)
        .map(|s| s.trim().to_string())
        .map_err(|e| tag_error(e.to_string()))
}

fn manifest_version(dir: &Path) -> Result<String> {
    let tag_error = |reason: String| HistoryError::Tag {
        source_name: "version",
        reason,
    };

    let manifest = dir.join("Cargo.toml");
    let content = std::fs::read_to_string(&manifest)
        .map_err(|e| tag_error(format!("{}: {e}", manifest.display())))?;
    let value: toml::Value = toml::from_str(&content).map_err(|e| tag_error(e.to_string()))?;

    value
        .get("package")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
        .or_else(|| {
            value
                .get("workspace")
                .and_then(|w| w.get("package"))
                .and_then(|p| p.get("version"))
                .and_then(|v| v.as_str())
        })
        .map(str::to_string)
        .ok_or_else(|| tag_error(format!("no version found in {}", manifest.display())))
}

fn today(format: &str) -> Result<String> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(HistoryError::Tag {
            source_name: "date",
            reason: format!("invalid date format '{format}'"),
        });
    }
    Ok(Utc::now().format(format).to_string())
}
