use config::{Config as ConfigBuilder, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::errors::{ScanError, ScanResult};
use crate::scan::Strategy;
use crate::search::Algorithm;

/// Default number of concurrent workers
pub const DEFAULT_THREAD_COUNT: usize = 10;

/// Configuration for a scan.
///
/// # Configuration Locations
///
/// Loaded from these locations, later ones taking precedence:
/// 1. Global `$CONFIG_DIR/sigscout/config.yaml`
/// 2. Local `.sigscout.yaml` in the current directory
/// 3. A file given with `--config`
///
/// Command-line values are applied last with [`ScanConfig::merge_with_cli`].
///
/// # Configuration Format
///
/// ```yaml
/// root_path: "./samples"
/// patterns_path: "./patterns.db"
/// algorithm: "kmp"            # naive | kmp | rabin-karp
/// strategy: "wavefront"       # per-file | wavefront
/// thread_count: 10
/// recursive: true
/// ignore_patterns:
///   - "*.log"
/// log_level: "info"
/// timing: false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory whose files are classified
    pub root_path: PathBuf,

    /// Pattern database file
    pub patterns_path: PathBuf,

    /// Substring search algorithm
    pub algorithm: Algorithm,

    /// Work distribution across the worker pool
    pub strategy: Strategy,

    /// Number of worker threads
    pub thread_count: NonZeroUsize,

    /// Descend into subdirectories
    pub recursive: bool,

    /// Globs for files to leave out
    pub ignore_patterns: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Report how long the scan took
    pub timing: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::new(),
            patterns_path: PathBuf::new(),
            algorithm: Algorithm::default(),
            strategy: Strategy::default(),
            thread_count: default_thread_count(),
            recursive: true,
            ignore_patterns: Vec::new(),
            log_level: default_log_level(),
            timing: false,
        }
    }
}

fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_THREAD_COUNT).unwrap_or(NonZeroUsize::MIN)
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Values given on the command line; `None` leaves the file value alone
#[derive(Debug, Clone, Default)]
pub struct ScanOverrides {
    pub root_path: Option<PathBuf>,
    pub patterns_path: Option<PathBuf>,
    pub algorithm: Option<Algorithm>,
    pub strategy: Option<Strategy>,
    pub thread_count: Option<NonZeroUsize>,
    pub recursive: Option<bool>,
    pub ignore_patterns: Vec<String>,
    pub log_level: Option<String>,
    pub timing: Option<bool>,
}

impl ScanConfig {
    pub fn new(root_path: impl Into<PathBuf>, patterns_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            patterns_path: patterns_path.into(),
            ..Default::default()
        }
    }

    /// Loads configuration from the default locations
    pub fn load() -> ScanResult<Self> {
        Self::load_from(None)
    }

    /// Loads configuration, layering `config_path` over the default locations
    pub fn load_from(config_path: Option<&Path>) -> ScanResult<Self> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ScanError::config_error(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
        }

        let mut builder = ConfigBuilder::builder();

        let config_files = [
            dirs::config_dir().map(|p| p.join("sigscout/config.yaml")),
            Some(PathBuf::from(".sigscout.yaml")),
            config_path.map(PathBuf::from),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()));
            }
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Applies command-line values over configuration file values
    pub fn merge_with_cli(mut self, cli: ScanOverrides) -> Self {
        if let Some(root_path) = cli.root_path {
            self.root_path = root_path;
        }
        if let Some(patterns_path) = cli.patterns_path {
            self.patterns_path = patterns_path;
        }
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(strategy) = cli.strategy {
            self.strategy = strategy;
        }
        if let Some(thread_count) = cli.thread_count {
            self.thread_count = thread_count;
        }
        if let Some(recursive) = cli.recursive {
            self.recursive = recursive;
        }
        if !cli.ignore_patterns.is_empty() {
            self.ignore_patterns = cli.ignore_patterns;
        }
        if let Some(log_level) = cli.log_level {
            self.log_level = log_level;
        }
        if let Some(timing) = cli.timing {
            self.timing = timing;
        }
        self
    }

    /// Checks required inputs before any scanning starts
    pub fn validate(&self) -> ScanResult<()> {
        if self.root_path.as_os_str().is_empty() {
            return Err(ScanError::invalid_arguments("no directory to scan was given"));
        }
        if !self.root_path.is_dir() {
            return Err(ScanError::invalid_arguments(format!(
                "{} is not a directory",
                self.root_path.display()
            )));
        }
        if self.patterns_path.as_os_str().is_empty() {
            return Err(ScanError::invalid_arguments("no pattern database was given"));
        }
        if !self.patterns_path.is_file() {
            return Err(ScanError::invalid_arguments(format!(
                "pattern database {} does not exist",
                self.patterns_path.display()
            )));
        }
        Ok(())
    }
}
