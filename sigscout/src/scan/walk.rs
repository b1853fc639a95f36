use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::target::ScanTarget;
use crate::errors::{ScanError, ScanResult};
use crate::filters::{compile_ignore_patterns, should_ignore};

/// Enumerates the regular files under `root` in a stable, path-sorted order.
///
/// Hidden and git-ignored files are classified like any other file; only the
/// supplied `ignore_patterns` exclude anything. Entries the walk cannot list
/// are left out here; [`collect_targets`] reports them per file.
pub fn collect_files(root: &Path, recursive: bool, ignore_patterns: &[String]) -> ScanResult<Vec<PathBuf>> {
    Ok(collect_targets(root, recursive, ignore_patterns)?
        .into_iter()
        .filter_map(|target| match target {
            ScanTarget::OnDisk { path, .. } => Some(path),
            _ => None,
        })
        .collect())
}

/// Enumerates `root` into on-disk scan targets, sorted by path.
///
/// An entry that cannot be listed becomes an unlistable target, so it gets
/// its own unreadable line instead of vanishing from the output.
pub fn collect_targets(root: &Path, recursive: bool, ignore_patterns: &[String]) -> ScanResult<Vec<ScanTarget>> {
    if !root.is_dir() {
        return Err(ScanError::invalid_arguments(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let ignore = compile_ignore_patterns(ignore_patterns);

    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(false)
        .max_depth(if recursive { None } else { Some(1) });

    let mut targets: Vec<ScanTarget> = builder
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_some_and(|ft| ft.is_file()) => {
                Some(ScanTarget::on_disk(entry.into_path()))
            }
            Ok(_) => None,
            Err(e) => unlistable_target(&e),
        })
        .filter(|target| target.path().is_some_and(|path| !should_ignore(path, root, &ignore)))
        .collect();

    targets.sort_by(|a, b| a.path().cmp(&b.path()));
    debug!("Found {} files under {}", targets.len(), root.display());
    Ok(targets)
}

/// Turns a walk error into a target when the error names a path
fn unlistable_target(err: &ignore::Error) -> Option<ScanTarget> {
    match error_path(err) {
        Some(path) => {
            warn!("Could not list {}: {}", path.display(), err);
            let io_error = err
                .io_error()
                .map(|e| io::Error::new(e.kind(), e.to_string()))
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, err.to_string()));
            Some(ScanTarget::unlistable(path, &io_error))
        }
        None => {
            warn!("Skipping unlistable entry: {}", err);
            None
        }
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => error_path(err),
        _ => None,
    }
}
