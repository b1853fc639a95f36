use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Instant;
use tracing::info;

use super::coordinator::{CancellationToken, ScanCoordinator, Strategy};
use super::target::ScanTarget;
use super::walk::collect_targets;
use crate::classifier::Classifier;
use crate::config::ScanConfig;
use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;
use crate::patterns::PatternDatabase;
use crate::results::ScanReport;
use crate::search::Algorithm;

/// Classifies every file under `config.root_path` with the configured database.
///
/// Arguments are validated and the database is loaded before any file is
/// touched; a malformed database aborts the scan. Unreadable files are
/// reported per file.
pub fn scan(config: &ScanConfig) -> ScanResult<ScanReport> {
    scan_with_cancellation(config, CancellationToken::new())
}

/// Like [`scan`], stopping early once `token` is cancelled
pub fn scan_with_cancellation(config: &ScanConfig, token: CancellationToken) -> ScanResult<ScanReport> {
    config.validate()?;
    info!(
        "Scanning {} with patterns from {}",
        config.root_path.display(),
        config.patterns_path.display()
    );

    let database = PatternDatabase::load(&config.patterns_path)?;
    let targets = collect_targets(&config.root_path, config.recursive, &config.ignore_patterns)?;
    classify_targets(
        &database,
        &targets,
        config.algorithm,
        config.strategy,
        config.thread_count,
        token,
    )
}

/// Classifies an explicit list of targets
pub fn classify_targets(
    database: &PatternDatabase,
    targets: &[ScanTarget],
    algorithm: Algorithm,
    strategy: Strategy,
    thread_count: NonZeroUsize,
    token: CancellationToken,
) -> ScanResult<ScanReport> {
    let metrics = ScanMetrics::new();
    let classifier = Classifier::with_metrics(database, algorithm, metrics.clone());
    let coordinator = ScanCoordinator::new(classifier, strategy, thread_count)?.with_cancellation(token);

    let start = Instant::now();
    let mut report = coordinator.run(targets);
    report.elapsed = start.elapsed();

    metrics.log_stats(report.elapsed);
    info!(
        "Scan complete. {} files: {} matched, {} unknown, {} unreadable",
        report.files_scanned, report.files_matched, report.files_unknown, report.files_unreadable
    );
    Ok(report)
}

/// Tests a single signature against one file, or every file of a directory.
pub fn check(
    path: &Path,
    signature: &[u8],
    type_name: &str,
    algorithm: Algorithm,
    thread_count: NonZeroUsize,
) -> ScanResult<ScanReport> {
    let targets = if path.is_dir() {
        collect_targets(path, false, &[])?
    } else if path.is_file() {
        vec![ScanTarget::on_disk(path)]
    } else {
        return Err(ScanError::invalid_arguments(format!(
            "{} does not exist",
            path.display()
        )));
    };

    let database = PatternDatabase::single(signature, type_name);
    classify_targets(
        &database,
        &targets,
        algorithm,
        Strategy::PerFile,
        thread_count,
        CancellationToken::new(),
    )
}
