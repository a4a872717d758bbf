#![warn(missing_docs)]
//! SuiteBench CLI Library
//!
//! This module provides the CLI infrastructure for benchmark binaries.
//! Build a [`Registry`] in your main function and hand it to
//! `suitebench::run()` (or `suitebench_cli::run()`) to get the full
//! suitebench CLI experience with your declared suites.
//!
//! # Example
//!
//! ```ignore
//! use suitebench::prelude::*;
//!
//! fn main() -> anyhow::Result<RunOutcome> {
//!     let mut registry = Registry::new();
//!     registry.suite("parsing", |s| {
//!         s.bench("small input", || parse(SMALL));
//!     });
//!     suitebench::run(registry)
//! }
//! ```

mod config;
mod runner;

pub use config::*;
pub use runner::{LOCAL_TAG, RunOptions, RunOutcome, Runner, Scheduler, Session, Step};

use anyhow::Context;
use clap::{Parser, Subcommand};
use regex::Regex;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use suitebench_core::{CycleEngine, EngineConfig, Eligibility, Registry};
use suitebench_history::{BaselineScope, FileRepository, MemoryRepository, TagSource};
use suitebench_report::{JsonReporter, ReporterKind, SpecReporter};
use tracing_subscriber::EnvFilter;

/// SuiteBench CLI arguments
#[derive(Parser, Debug, Default)]
#[command(name = "suitebench")]
#[command(author, version, about = "SuiteBench - benchmark suites with regression gating")]
pub struct Cli {
    /// Optional subcommand (List, Run); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Only run suites whose name matches this regex
    pub filter: Option<String>,

    /// Reporter: spec or json
    #[arg(short, long)]
    pub reporter: Option<String>,

    /// Run history backend: file or memory
    #[arg(short = 'R', long)]
    pub repository: Option<String>,

    /// Run tag: git, version, date or any literal tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// strftime format used by the date tag
    #[arg(short = 'T', long)]
    pub tag_date_format: Option<String>,

    /// History file used by the file repository
    #[arg(long)]
    pub file_name: Option<PathBuf>,

    /// Percentage change that counts as a regression or improvement
    #[arg(long)]
    pub error_margin: Option<f64>,

    /// Record regressions without failing the run
    #[arg(long, visible_alias = "enable-regressions")]
    pub allow_regressions: bool,

    /// Which earlier runs may serve as a baseline: any-tag or same-tag
    #[arg(long)]
    pub baseline_scope: Option<String>,

    /// Warmup duration (e.g., "1s", "200ms")
    #[arg(long)]
    pub warmup: Option<String>,

    /// Minimum time spent in measured cycles (e.g., "5s")
    #[arg(long)]
    pub measurement: Option<String>,

    /// Minimum number of measured cycles
    #[arg(long)]
    pub min_cycles: Option<u64>,

    /// Maximum number of measured cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file (default: nearest suitebench.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Internal: Absorb cargo bench's --bench flag
    #[arg(long, hide = true)]
    pub bench: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// List every declared suite and whether it would run
    List,
    /// Run suites (default)
    Run,
}

/// Run history backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RepositoryKind {
    /// JSON file that survives between invocations
    #[default]
    File,
    /// History kept for this process only
    Memory,
}

impl std::str::FromStr for RepositoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(RepositoryKind::File),
            "memory" => Ok(RepositoryKind::Memory),
            other => Err(format!("Unknown repository: {}", other)),
        }
    }
}

/// Fully resolved settings: suitebench.toml values with CLI overrides applied
#[derive(Debug, Clone)]
pub struct Settings {
    /// Reporter
    pub reporter: ReporterKind,
    /// Run history backend
    pub repository: RepositoryKind,
    /// History file of the file repository
    pub history_file: PathBuf,
    /// Source of the active tag
    pub tag: TagSource,
    /// Timing engine configuration
    pub engine: EngineConfig,
    /// Classification and selection options
    pub options: RunOptions,
    /// Report destination (stdout if `None`)
    pub output: Option<PathBuf>,
}

impl Settings {
    /// Layer CLI flags over configuration file values and validate the result
    pub fn resolve(cli: &Cli, config: &SuiteConfig) -> anyhow::Result<Self> {
        let reporter: ReporterKind = cli
            .reporter
            .as_deref()
            .unwrap_or(&config.output.reporter)
            .parse()
            .map_err(anyhow::Error::msg)?;
        let repository: RepositoryKind = cli
            .repository
            .as_deref()
            .unwrap_or(&config.history.repository)
            .parse()
            .map_err(anyhow::Error::msg)?;
        let baseline_scope: BaselineScope = cli
            .baseline_scope
            .as_deref()
            .unwrap_or(&config.history.baseline)
            .parse()
            .map_err(anyhow::Error::msg)?;

        let error_margin = cli.error_margin.unwrap_or(config.ci.error_margin);
        if !error_margin.is_finite() || error_margin < 0.0 {
            anyhow::bail!("Invalid error margin: {}", error_margin);
        }

        let filter = cli
            .filter
            .as_deref()
            .map(Regex::new)
            .transpose()
            .context("Invalid suite filter")?;

        let date_format = cli
            .tag_date_format
            .as_deref()
            .unwrap_or(&config.history.tag_date_format);
        let tag = TagSource::parse(cli.tag.as_deref().unwrap_or(&config.history.tag), date_format);

        let runner = &config.runner;
        let engine = EngineConfig {
            warmup_time: SuiteConfig::parse_duration(
                cli.warmup.as_deref().unwrap_or(&runner.warmup_time),
            )
            .context("Invalid warmup time")?,
            measurement_time: SuiteConfig::parse_duration(
                cli.measurement.as_deref().unwrap_or(&runner.measurement_time),
            )
            .context("Invalid measurement time")?,
            min_cycle_time: SuiteConfig::parse_duration(&runner.min_cycle_time)
                .context("Invalid minimum cycle time")?,
            min_cycles: cli.min_cycles.unwrap_or(runner.min_cycles),
            max_cycles: cli.max_cycles.or(runner.max_cycles),
        };

        Ok(Self {
            reporter,
            repository,
            history_file: cli
                .file_name
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.history.file)),
            tag,
            engine,
            options: RunOptions {
                error_margin,
                allow_regressions: cli.allow_regressions || config.ci.allow_regressions,
                baseline_scope,
                filter,
            },
            output: cli
                .output
                .clone()
                .or_else(|| config.output.file.as_ref().map(PathBuf::from)),
        })
    }
}

/// Run the SuiteBench CLI over `registry` with the process arguments.
/// This is the main entry point for benchmark binaries.
///
/// # Returns
/// Returns the run outcome, whose exit status is nonzero if any failure was
/// recorded, or an error if the run could not be carried out.
pub fn run(registry: Registry) -> anyhow::Result<RunOutcome> {
    let cli = Cli::parse();
    run_with_cli(registry, cli)
}

/// Run the SuiteBench CLI with pre-parsed arguments.
pub fn run_with_cli(registry: Registry, cli: Cli) -> anyhow::Result<RunOutcome> {
    init_logging(cli.verbose);

    // Discover suitebench.toml configuration (CLI flags override)
    let config = match &cli.config {
        Some(path) => SuiteConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SuiteConfig::discover().unwrap_or_default(),
    };
    let settings = Settings::resolve(&cli, &config)?;

    match cli.command {
        Some(Commands::List) => list_suites(&registry, &settings),
        Some(Commands::Run) | None => run_suites(registry, &settings),
    }
}

/// Install the fmt subscriber on stderr; `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose {
        "suitebench=debug"
    } else {
        "suitebench=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed by the host binary
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_suites(registry: Registry, settings: &Settings) -> anyhow::Result<RunOutcome> {
    let tag = settings.tag.resolve().context("Failed to resolve run tag")?;
    tracing::debug!(tag = %tag, repository = ?settings.repository, "resolved run tag");

    let mut runner = Runner::new(settings.options.clone())
        .with_engine(CycleEngine::new(settings.engine));
    runner = match settings.repository {
        RepositoryKind::File => {
            runner.with_repository(FileRepository::new(&settings.history_file, tag))
        }
        RepositoryKind::Memory => runner.with_repository(MemoryRepository::new(tag)),
    };
    runner = match (&settings.output, settings.reporter) {
        (None, ReporterKind::Spec) => runner.with_reporter(SpecReporter::stdout()),
        (None, ReporterKind::Json) => runner.with_reporter(JsonReporter::new(std::io::stdout())),
        (Some(path), kind) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let out = BufWriter::new(file);
            match kind {
                ReporterKind::Spec => runner.with_reporter(SpecReporter::new(out)),
                ReporterKind::Json => runner.with_reporter(JsonReporter::new(out)),
            }
        }
    };

    let outcome = runner.run(registry)?;
    if let Some(path) = &settings.output {
        tracing::info!(path = %path.display(), "report written");
    }
    Ok(outcome)
}

fn list_suites(registry: &Registry, settings: &Settings) -> anyhow::Result<RunOutcome> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_plan(&mut out, registry, settings)?;
    Ok(RunOutcome::default())
}

/// Print every declared suite with its eligibility and benchmark names
fn write_plan(
    out: &mut impl Write,
    registry: &Registry,
    settings: &Settings,
) -> anyhow::Result<()> {
    writeln!(out, "SuiteBench Plan:")?;

    let filter = registry.filter().with_pattern(settings.options.filter.clone());
    let mut runnable = 0;
    for suite in registry.suites() {
        let status = match filter.resolve(suite) {
            Eligibility::Run => {
                runnable += 1;
                "run".to_string()
            }
            Eligibility::Skip(reason) => format!("skip: {reason}"),
        };
        let label = if suite.is_comparison() { "compare" } else { "suite" };
        writeln!(out, "├── {}: {} [{}]", label, suite.name(), status)?;
        for bench in suite.benchmarks() {
            writeln!(out, "│   ├── {}", bench.name())?;
        }
    }

    writeln!(
        out,
        "{} of {} suites would run.",
        runnable,
        registry.suites().len()
    )?;
    Ok(())
}
