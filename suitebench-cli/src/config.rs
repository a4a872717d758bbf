//! Configuration loading from suitebench.toml
//!
//! SuiteBench configuration can be specified in a `suitebench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the configuration file looked up by [`SuiteConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "suitebench.toml";

/// SuiteBench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SuiteConfig {
    /// Timing engine configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Run history configuration
    #[serde(default)]
    pub history: HistoryConfig,
    /// CI gating configuration
    #[serde(default)]
    pub ci: CiConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Timing engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Warmup duration before measurement (e.g., "1s")
    #[serde(default = "default_warmup")]
    pub warmup_time: String,
    /// Minimum time spent in measured cycles (e.g., "5s")
    #[serde(default = "default_measurement")]
    pub measurement_time: String,
    /// Minimum number of measured cycles
    #[serde(default = "default_min_cycles")]
    pub min_cycles: u64,
    /// Maximum number of measured cycles
    #[serde(default)]
    pub max_cycles: Option<u64>,
    /// Target duration of one cycle (e.g., "50ms")
    #[serde(default = "default_min_cycle_time")]
    pub min_cycle_time: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            warmup_time: default_warmup(),
            measurement_time: default_measurement(),
            min_cycles: default_min_cycles(),
            max_cycles: None,
            min_cycle_time: default_min_cycle_time(),
        }
    }
}

fn default_warmup() -> String {
    "1s".to_string()
}
fn default_measurement() -> String {
    "5s".to_string()
}
fn default_min_cycles() -> u64 {
    5
}
fn default_min_cycle_time() -> String {
    "50ms".to_string()
}

/// Run history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Repository backend: "file" or "memory"
    #[serde(default = "default_repository")]
    pub repository: String,
    /// History file used by the file repository
    #[serde(default = "default_history_file")]
    pub file: String,
    /// Run tag: "git", "version", "date" or a literal tag
    #[serde(default = "default_tag")]
    pub tag: String,
    /// strftime format of the date tag
    #[serde(default = "default_tag_date_format")]
    pub tag_date_format: String,
    /// Baseline lookup scope: "any-tag" or "same-tag"
    #[serde(default = "default_baseline")]
    pub baseline: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            repository: default_repository(),
            file: default_history_file(),
            tag: default_tag(),
            tag_date_format: default_tag_date_format(),
            baseline: default_baseline(),
        }
    }
}

fn default_repository() -> String {
    "file".to_string()
}
fn default_history_file() -> String {
    suitebench_history::DEFAULT_HISTORY_FILE.to_string()
}
fn default_tag() -> String {
    "git".to_string()
}
fn default_tag_date_format() -> String {
    suitebench_history::DEFAULT_DATE_FORMAT.to_string()
}
fn default_baseline() -> String {
    "any-tag".to_string()
}

/// CI gating configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiConfig {
    /// Percentage change that counts as a regression or improvement
    #[serde(default = "default_error_margin")]
    pub error_margin: f64,
    /// Record regressions without failing the run
    #[serde(default)]
    pub allow_regressions: bool,
}

impl Default for CiConfig {
    fn default() -> Self {
        Self {
            error_margin: default_error_margin(),
            allow_regressions: false,
        }
    }
}

fn default_error_margin() -> f64 {
    suitebench_stats::DEFAULT_ERROR_MARGIN
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Reporter: "spec" or "json"
    #[serde(default = "default_reporter")]
    pub reporter: String,
    /// Write the report to this file instead of stdout
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            reporter: default_reporter(),
            file: None,
        }
    }
}

fn default_reporter() -> String {
    "spec".to_string()
}

impl SuiteConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Find `suitebench.toml` by walking up from the current directory
    pub fn find() -> Option<PathBuf> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let path = Self::find()?;
        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                None
            }
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# SuiteBench Configuration
# https://github.com/ml-rust/suitebench

[runner]
# Warmup duration before measurement
warmup_time = "1s"
# Minimum time spent in measured cycles
measurement_time = "5s"
# Minimum number of measured cycles
min_cycles = 5
# Maximum number of measured cycles (uncomment to enable)
# max_cycles = 100
# Target duration of one cycle
min_cycle_time = "50ms"

[history]
# Repository backend: file or memory
repository = "file"
# History file for the file repository
file = "bench/.suitebench.json"
# Run tag: git, version, date or any literal tag
tag = "git"
# Format of the date tag
tag_date_format = "%Y-%m-%d"
# Baseline lookup: any-tag or same-tag
baseline = "any-tag"

[ci]
# Percentage change that counts as a regression or improvement
error_margin = 2.5
# Record regressions without failing the run
allow_regressions = false

[output]
# Reporter: spec or json
reporter = "spec"
# Write the report to a file instead of stdout (uncomment to enable)
# file = "target/suitebench/report.json"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * multiplier as f64) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SuiteConfig::default();
        assert_eq!(config.runner.warmup_time, "1s");
        assert_eq!(config.runner.measurement_time, "5s");
        assert_eq!(config.runner.min_cycles, 5);
        assert_eq!(config.history.file, "bench/.suitebench.json");
        assert_eq!(config.history.tag, "git");
        assert!((config.ci.error_margin - 2.5).abs() < f64::EPSILON);
        assert!(!config.ci.allow_regressions);
    }

    #[test]
    fn test_parse_duration() {
        let parse = |s| SuiteConfig::parse_duration(s).unwrap();
        assert_eq!(parse("3s"), Duration::from_secs(3));
        assert_eq!(parse("500ms"), Duration::from_millis(500));
        assert_eq!(parse("100us"), Duration::from_micros(100));
        assert_eq!(parse("2m"), Duration::from_secs(120));
        assert_eq!(parse("1.5s"), Duration::from_millis(1500));
        assert_eq!(parse("2"), Duration::from_secs(2));
        assert!(SuiteConfig::parse_duration("").is_err());
        assert!(SuiteConfig::parse_duration("5 parsecs").is_err());
        assert!(SuiteConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            warmup_time = "200ms"
            max_cycles = 10

            [ci]
            allow_regressions = true
        "#;

        let config: SuiteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.warmup_time, "200ms");
        assert_eq!(config.runner.max_cycles, Some(10));
        assert!(config.ci.allow_regressions);
        // Defaults should still apply
        assert_eq!(config.output.reporter, "spec");
        assert_eq!(config.history.baseline, "any-tag");
    }

    #[test]
    fn test_default_toml_parses() {
        let default_toml = SuiteConfig::default_toml();
        let config: SuiteConfig = toml::from_str(&default_toml).unwrap();
        assert_eq!(config.runner.min_cycle_time, "50ms");
        assert_eq!(config.history.repository, "file");
    }
}
