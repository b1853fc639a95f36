pub mod classifier;
pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod patterns;
pub mod results;
pub mod scan;
pub mod search;

pub use classifier::Classifier;
pub use config::{ScanConfig, ScanOverrides};
pub use errors::{ScanError, ScanResult};
pub use patterns::{Pattern, PatternDatabase};
pub use results::{FileOutcome, Outcome, ScanReport, UNKNOWN_FILE_TYPE};
pub use scan::{check, scan, CancellationToken, ScanCoordinator, ScanTarget, Strategy};
pub use search::{Algorithm, SignatureMatcher};
