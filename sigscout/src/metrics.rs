use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::scan::target::MMAP_THRESHOLD;

/// Counters shared by every worker of a scan
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    // File loading
    files_read: Arc<AtomicU64>,
    bytes_read: Arc<AtomicU64>,
    mmap_reads: Arc<AtomicU64>,
    unreadable_files: Arc<AtomicU64>,

    // Matching
    signature_tests: Arc<AtomicU64>,
    signature_matches: Arc<AtomicU64>,
    waves: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            files_read: Arc::new(AtomicU64::new(0)),
            bytes_read: Arc::new(AtomicU64::new(0)),
            mmap_reads: Arc::new(AtomicU64::new(0)),
            unreadable_files: Arc::new(AtomicU64::new(0)),
            signature_tests: Arc::new(AtomicU64::new(0)),
            signature_matches: Arc::new(AtomicU64::new(0)),
            waves: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records one file load of `size` bytes
    pub fn record_file_read(&self, size: u64) {
        self.files_read.fetch_add(1, Ordering::Relaxed);
        let total = self.bytes_read.fetch_add(size, Ordering::Relaxed) + size;
        if size >= MMAP_THRESHOLD {
            self.mmap_reads.fetch_add(1, Ordering::Relaxed);
        }
        debug!("Read {} bytes, total read: {} bytes", size, total);
    }

    pub fn record_unreadable(&self) {
        self.unreadable_files.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one signature tested against one file
    pub fn record_signature_test(&self, matched: bool) {
        self.signature_tests.fetch_add(1, Ordering::Relaxed);
        if matched {
            self.signature_matches.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_wave(&self) {
        self.waves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn signature_tests(&self) -> u64 {
        self.signature_tests.load(Ordering::Relaxed)
    }

    pub fn waves(&self) -> u64 {
        self.waves.load(Ordering::Relaxed)
    }

    /// Snapshot of all counters
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            files_read: self.files_read.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            mmap_reads: self.mmap_reads.load(Ordering::Relaxed),
            unreadable_files: self.unreadable_files.load(Ordering::Relaxed),
            signature_tests: self.signature_tests.load(Ordering::Relaxed),
            signature_matches: self.signature_matches.load(Ordering::Relaxed),
            waves: self.waves.load(Ordering::Relaxed),
        }
    }

    /// Logs the counters together with the wall-clock time of the scan
    pub fn log_stats(&self, elapsed: Duration) {
        let stats = self.get_stats();
        info!(
            "Scan stats:\n\
             Elapsed: {}\n\
             Files read (mmap): {} ({})\n\
             Bytes read: {}\n\
             Unreadable files: {}\n\
             Signature tests/matches: {}/{}\n\
             Waves: {}",
            humantime::format_duration(elapsed),
            stats.files_read,
            stats.mmap_reads,
            stats.bytes_read,
            stats.unreadable_files,
            stats.signature_tests,
            stats.signature_matches,
            stats.waves
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`ScanMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub files_read: u64,
    pub bytes_read: u64,
    pub mmap_reads: u64,
    pub unreadable_files: u64,
    pub signature_tests: u64,
    pub signature_matches: u64,
    pub waves: u64,
}
