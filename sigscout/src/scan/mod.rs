//! Concurrent classification of many files.
//!
//! A fixed-size rayon pool runs the work. Two strategies are available:
//!
//! - **Per-file** ([`Strategy::PerFile`]): one task per file runs the whole
//!   classifier; results are collected in submission order.
//! - **Wavefront** ([`Strategy::Wavefront`]): patterns are visited in match
//!   order and each wave tests one pattern against every file still
//!   unclassified, joining before the next wave. Files are never tested
//!   against lower-priority patterns once classified, at the cost of one
//!   barrier per pattern.
//!
//! The pattern database and its compiled matchers are shared read-only; each
//! file's bytes belong to the task that loaded them.

pub mod coordinator;
pub mod engine;
pub mod target;
pub mod walk;

pub use coordinator::{CancellationToken, ScanCoordinator, Strategy};
pub use engine::{check, classify_targets, scan, scan_with_cancellation};
pub use target::{FileBytes, ScanTarget};
pub use walk::{collect_files, collect_targets};
