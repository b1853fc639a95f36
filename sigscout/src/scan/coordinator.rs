use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::target::{FileBytes, ScanTarget};
use crate::classifier::Classifier;
use crate::errors::{ScanError, ScanResult};
use crate::results::{FileOutcome, Outcome, ScanReport};

/// How work is split across the worker pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One task per file running the whole classifier
    #[default]
    PerFile,
    /// One round per pattern, testing only files not yet classified
    Wavefront,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::PerFile => "per-file",
            Strategy::Wavefront => "wavefront",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "per-file" | "perfile" | "file" => Ok(Strategy::PerFile),
            "wavefront" | "per-pattern" | "wave" => Ok(Strategy::Wavefront),
            other => Err(ScanError::invalid_arguments(format!(
                "unknown strategy '{}' (expected per-file or wavefront)",
                other
            ))),
        }
    }
}

/// Shared flag that stops a scan from starting new work
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs a [`Classifier`] over many files on a bounded worker pool.
///
/// Whatever the strategy, the report holds exactly one outcome per target,
/// in the order the targets were given. A file that cannot be read is
/// reported as [`Outcome::Unreadable`] without affecting any other file.
pub struct ScanCoordinator {
    classifier: Classifier,
    strategy: Strategy,
    pool: ThreadPool,
    cancellation: CancellationToken,
}

impl ScanCoordinator {
    pub fn new(classifier: Classifier, strategy: Strategy, thread_count: NonZeroUsize) -> ScanResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(thread_count.get())
            .thread_name(|i| format!("sigscout-worker-{}", i))
            .build()
            .map_err(|e| ScanError::config_error(format!("failed to start worker pool: {}", e)))?;

        Ok(Self {
            classifier,
            strategy,
            pool,
            cancellation: CancellationToken::new(),
        })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn thread_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Classifies every target and returns one outcome per target
    pub fn run(&self, targets: &[ScanTarget]) -> ScanReport {
        debug!(
            "Classifying {} files with {} patterns ({}, {}, {} workers)",
            targets.len(),
            self.classifier.entries().len(),
            self.strategy,
            self.classifier.algorithm(),
            self.thread_count()
        );

        let outcomes = match self.strategy {
            Strategy::PerFile => self.run_per_file(targets),
            Strategy::Wavefront => self.run_wavefront(targets),
        };

        targets
            .iter()
            .zip(outcomes)
            .map(|(target, outcome)| {
                FileOutcome::new(target.name(), target.path().map(Into::into), outcome)
            })
            .collect()
    }

    fn run_per_file(&self, targets: &[ScanTarget]) -> Vec<Outcome> {
        // Indexed collect keeps submission order regardless of completion order.
        self.pool.install(|| {
            targets
                .par_iter()
                .map(|target| self.classify_target(target))
                .collect()
        })
    }

    fn classify_target(&self, target: &ScanTarget) -> Outcome {
        if self.cancellation.is_cancelled() {
            return Outcome::Skipped;
        }

        trace!("Classifying {}", target.name());
        match target.load(self.classifier.metrics()) {
            Ok(bytes) => match self.classifier.classify(&bytes) {
                Some(type_name) => Outcome::Matched(type_name.to_string()),
                None => Outcome::Unknown,
            },
            Err(e) => self.unreadable(target, e),
        }
    }

    fn run_wavefront(&self, targets: &[ScanTarget]) -> Vec<Outcome> {
        if self.cancellation.is_cancelled() {
            return vec![Outcome::Skipped; targets.len()];
        }

        let metrics = self.classifier.metrics();
        let mut outcomes: Vec<Option<Outcome>> = vec![None; targets.len()];

        // Every file is read once; its bytes are dropped as soon as it is
        // classified and the waves only borrow them.
        let loaded: Vec<ScanResult<FileBytes<'_>>> = self.pool.install(|| {
            targets
                .par_iter()
                .map(|target| target.load(metrics))
                .collect()
        });
        let mut contents: Vec<Option<FileBytes<'_>>> = loaded
            .into_iter()
            .zip(targets)
            .enumerate()
            .map(|(i, (result, target))| match result {
                Ok(bytes) => Some(bytes),
                Err(e) => {
                    outcomes[i] = Some(self.unreadable(target, e));
                    None
                }
            })
            .collect();

        let mut finished = true;
        for (index, entry) in self.classifier.entries().iter().enumerate() {
            if self.cancellation.is_cancelled() {
                finished = false;
                break;
            }

            let pending: Vec<usize> = (0..targets.len())
                .filter(|&i| outcomes[i].is_none())
                .collect();
            if pending.is_empty() {
                debug!("All files classified after {} waves", index);
                break;
            }

            metrics.record_wave();
            debug!(
                "Wave {}: testing '{}' against {} files",
                index,
                entry.type_name,
                pending.len()
            );

            let matched: Vec<usize> = self.pool.install(|| {
                pending
                    .par_iter()
                    .copied()
                    .filter(|&i| {
                        contents[i]
                            .as_deref()
                            .is_some_and(|bytes| self.classifier.test(index, bytes))
                    })
                    .collect()
            });

            // Joined: fold the wave in before the next pattern starts.
            for i in matched {
                outcomes[i] = Some(Outcome::Matched(entry.type_name.to_string()));
                contents[i] = None;
            }
        }

        outcomes
            .into_iter()
            .map(|outcome| match outcome {
                Some(outcome) => outcome,
                None if finished => Outcome::Unknown,
                None => Outcome::Skipped,
            })
            .collect()
    }

    fn unreadable(&self, target: &ScanTarget, err: ScanError) -> Outcome {
        warn!("Could not read {}: {}", target.name(), err.reason());
        self.classifier.metrics().record_unreadable();
        Outcome::Unreadable(err.reason())
    }
}
