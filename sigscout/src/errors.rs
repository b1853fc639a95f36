/// Error types for sigscout.
///
/// Errors fall into three groups:
///
/// 1. **Per-file errors** (`UnreadableFile`) are isolated to the task that hit
///    them. The scan records them against the file and keeps going.
/// 2. **Load-time errors** (`MalformedPatternEntry`) abort before any file is
///    classified, so a scan never runs against a partial signature set.
/// 3. **Argument errors** (`InvalidArguments`, `ConfigError`) are raised before
///    any I/O or scanning begins.
///
/// Algorithmic edge cases such as an empty signature are not errors; they are
/// defined behaviour of the search engine.
use std::path::PathBuf;
use thiserror::Error;

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while loading signatures or classifying files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Unreadable file {path}: {source}")]
    UnreadableFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed pattern entry on line {line}: {reason}")]
    MalformedPatternEntry { line: usize, reason: String },
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ScanError {
    pub fn unreadable_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::UnreadableFile {
            path: path.into(),
            source,
        }
    }

    pub fn malformed_entry(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedPatternEntry {
            line,
            reason: reason.into(),
        }
    }

    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Short description used when the error is reported next to a file name.
    pub fn reason(&self) -> String {
        match self {
            Self::UnreadableFile { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<config::ConfigError> for ScanError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}
