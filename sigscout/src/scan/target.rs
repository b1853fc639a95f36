use memmap2::Mmap;
use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use tracing::trace;

use crate::errors::{ScanError, ScanResult};
use crate::metrics::ScanMetrics;

/// Files at or above this size are memory-mapped instead of read
pub const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// A file to classify
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanTarget {
    /// Contents already in memory
    InMemory { name: String, bytes: Vec<u8> },
    /// Contents read from disk by the task that classifies the file
    OnDisk { name: String, path: PathBuf },
    /// An entry the directory walk could not list; loading always fails
    Unlistable {
        name: String,
        path: PathBuf,
        kind: io::ErrorKind,
        reason: String,
    },
}

impl ScanTarget {
    pub fn in_memory(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        ScanTarget::InMemory {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// An on-disk target named after the last component of `path`
    pub fn on_disk(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        ScanTarget::OnDisk {
            name: display_name(&path),
            path,
        }
    }

    /// A target that reports `error` as its read failure
    pub fn unlistable(path: impl Into<PathBuf>, error: &io::Error) -> Self {
        let path = path.into();
        ScanTarget::Unlistable {
            name: display_name(&path),
            path,
            kind: error.kind(),
            reason: error.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ScanTarget::InMemory { name, .. }
            | ScanTarget::OnDisk { name, .. }
            | ScanTarget::Unlistable { name, .. } => name,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            ScanTarget::InMemory { .. } => None,
            ScanTarget::OnDisk { path, .. } | ScanTarget::Unlistable { path, .. } => Some(path),
        }
    }

    /// Loads the file contents for one task.
    ///
    /// Read failures become [`ScanError::UnreadableFile`] for this file only.
    pub fn load(&self, metrics: &ScanMetrics) -> ScanResult<FileBytes<'_>> {
        match self {
            ScanTarget::InMemory { bytes, .. } => Ok(FileBytes::Borrowed(bytes)),
            ScanTarget::OnDisk { path, .. } => {
                let bytes = read_file(path).map_err(|e| ScanError::unreadable_file(path, e))?;
                metrics.record_file_read(bytes.len() as u64);
                Ok(bytes)
            }
            ScanTarget::Unlistable {
                path, kind, reason, ..
            } => Err(ScanError::unreadable_file(path, io::Error::new(*kind, reason.clone()))),
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_file(path: &Path) -> std::io::Result<FileBytes<'static>> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();

    if size >= MMAP_THRESHOLD {
        trace!("Memory mapping {} ({} bytes)", path.display(), size);
        // The mapping is read-only and dropped when the task finishes.
        let mmap = unsafe { Mmap::map(&file) }?;
        Ok(FileBytes::Mapped(mmap))
    } else {
        trace!("Reading {} ({} bytes)", path.display(), size);
        Ok(FileBytes::Owned(std::fs::read(path)?))
    }
}

/// File contents owned or borrowed by the task classifying the file
#[derive(Debug)]
pub enum FileBytes<'a> {
    Borrowed(&'a [u8]),
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for FileBytes<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            FileBytes::Borrowed(bytes) => bytes,
            FileBytes::Owned(bytes) => bytes.as_slice(),
            FileBytes::Mapped(mmap) => &mmap[..],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_in_memory_target_borrows_bytes() {
        let target = ScanTarget::in_memory("a.bin", b"%PDF-1.4".to_vec());
        let metrics = ScanMetrics::new();
        let bytes = target.load(&metrics).unwrap();
        assert!(matches!(bytes, FileBytes::Borrowed(_)));
        assert_eq!(&*bytes, b"%PDF-1.4");
        assert_eq!(target.name(), "a.bin");
        assert!(target.path().is_none());
        assert_eq!(metrics.get_stats().files_read, 0);
    }

    #[test]
    fn test_on_disk_target_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let target = ScanTarget::on_disk(&path);
        assert_eq!(target.name(), "doc.pdf");

        let metrics = ScanMetrics::new();
        let bytes = target.load(&metrics).unwrap();
        assert_eq!(&*bytes, b"%PDF-1.7");
        assert_eq!(metrics.get_stats().bytes_read, 8);
    }

    #[test]
    fn test_large_file_is_memory_mapped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("large.bin");
        let mut contents = vec![0u8; MMAP_THRESHOLD as usize];
        contents.extend_from_slice(b"TAIL");
        std::fs::write(&path, &contents).unwrap();

        let metrics = ScanMetrics::new();
        let target = ScanTarget::on_disk(&path);
        let bytes = target.load(&metrics).unwrap();
        assert!(matches!(bytes, FileBytes::Mapped(_)));
        assert!(bytes.ends_with(b"TAIL"));
        assert_eq!(metrics.get_stats().mmap_reads, 1);
    }

    #[test]
    fn test_unlistable_target_reports_its_error() {
        let error = io::Error::from(io::ErrorKind::PermissionDenied);
        let target = ScanTarget::unlistable("/data/secret", &error);
        assert_eq!(target.name(), "secret");
        assert_eq!(target.path(), Some(Path::new("/data/secret")));

        let metrics = ScanMetrics::new();
        match target.load(&metrics) {
            Err(err @ ScanError::UnreadableFile { .. }) => assert_eq!(err.reason(), error.to_string()),
            other => panic!("expected unreadable file, got {:?}", other),
        }
        assert_eq!(metrics.get_stats().files_read, 0);
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempdir().unwrap();
        let target = ScanTarget::on_disk(dir.path().join("gone.bin"));
        let err = target.load(&ScanMetrics::new()).unwrap_err();
        assert!(matches!(err, ScanError::UnreadableFile { .. }));
    }
}
