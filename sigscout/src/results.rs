use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Label printed for files that match no signature
pub const UNKNOWN_FILE_TYPE: &str = "Unknown file type";

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// The file contains the signature of this type
    Matched(String),
    /// No signature matched
    Unknown,
    /// The file could not be read; holds the reason
    Unreadable(String),
    /// The scan was cancelled before this file was finished
    Skipped,
}

/// Classification result for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    pub outcome: Outcome,
}

impl FileOutcome {
    pub fn new(file_name: impl Into<String>, path: Option<PathBuf>, outcome: Outcome) -> Self {
        Self {
            file_name: file_name.into(),
            path,
            outcome,
        }
    }

    /// The matched type name, if any
    pub fn matched_type(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Matched(type_name) => Some(type_name),
            _ => None,
        }
    }
}

/// The label printed after a file name
impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Matched(type_name) => f.write_str(type_name),
            Outcome::Unknown => f.write_str(UNKNOWN_FILE_TYPE),
            Outcome::Unreadable(reason) => write!(f, "Unreadable file ({})", reason),
            Outcome::Skipped => f.write_str("Skipped"),
        }
    }
}

impl fmt::Display for FileOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file_name, self.outcome)
    }
}

/// One outcome per scanned file, in enumeration order
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub outcomes: Vec<FileOutcome>,
    pub files_scanned: usize,
    pub files_matched: usize,
    pub files_unknown: usize,
    pub files_unreadable: usize,
    pub files_skipped: usize,
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn new() -> Self {
        Default::default()
    }

    /// Appends the outcome of the next file in enumeration order
    pub fn add_outcome(&mut self, outcome: FileOutcome) {
        self.files_scanned += 1;
        match outcome.outcome {
            Outcome::Matched(_) => self.files_matched += 1,
            Outcome::Unknown => self.files_unknown += 1,
            Outcome::Unreadable(_) => self.files_unreadable += 1,
            Outcome::Skipped => self.files_skipped += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Outcome for the first file called `file_name`
    pub fn get(&self, file_name: &str) -> Option<&FileOutcome> {
        self.outcomes.iter().find(|o| o.file_name == file_name)
    }

    /// Merges another report after this one
    pub fn merge(&mut self, other: ScanReport) {
        self.files_scanned += other.files_scanned;
        self.files_matched += other.files_matched;
        self.files_unknown += other.files_unknown;
        self.files_unreadable += other.files_unreadable;
        self.files_skipped += other.files_skipped;
        self.elapsed += other.elapsed;
        self.outcomes.extend(other.outcomes);
    }
}

impl FromIterator<FileOutcome> for ScanReport {
    fn from_iter<I: IntoIterator<Item = FileOutcome>>(iter: I) -> Self {
        let mut report = ScanReport::new();
        for outcome in iter {
            report.add_outcome(outcome);
        }
        report
    }
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_secs_f64())
    }
}
