use std::sync::Arc;
use tracing::trace;

use crate::metrics::ScanMetrics;
use crate::patterns::PatternDatabase;
use crate::search::{Algorithm, SignatureMatcher};

/// A pattern compiled for one algorithm
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub type_name: Arc<str>,
    pub priority: i64,
    pub matcher: SignatureMatcher,
}

/// Applies a pattern database to file contents.
///
/// Patterns are compiled once, in match order (last loaded first), and the
/// classifier holds no mutable state, so one instance is shared by every
/// worker of a scan.
#[derive(Debug, Clone)]
pub struct Classifier {
    entries: Vec<CompiledPattern>,
    algorithm: Algorithm,
    metrics: ScanMetrics,
}

impl Classifier {
    pub fn new(database: &PatternDatabase, algorithm: Algorithm) -> Self {
        Self::with_metrics(database, algorithm, ScanMetrics::new())
    }

    pub fn with_metrics(database: &PatternDatabase, algorithm: Algorithm, metrics: ScanMetrics) -> Self {
        let entries = database
            .match_order()
            .map(|pattern| CompiledPattern {
                type_name: Arc::from(pattern.type_name.as_str()),
                priority: pattern.priority,
                matcher: SignatureMatcher::compile(algorithm, &pattern.signature),
            })
            .collect();

        Self {
            entries,
            algorithm,
            metrics,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn metrics(&self) -> &ScanMetrics {
        &self.metrics
    }

    /// Compiled patterns in match order
    pub fn entries(&self) -> &[CompiledPattern] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tests the pattern at `index` (match order) against `bytes`
    pub fn test(&self, index: usize, bytes: &[u8]) -> bool {
        let entry = &self.entries[index];
        let matched = entry.matcher.is_found_in(bytes);
        self.metrics.record_signature_test(matched);
        trace!(
            "Pattern {} ({}) {}",
            index,
            entry.type_name,
            if matched { "matched" } else { "did not match" }
        );
        matched
    }

    /// Type name of the first pattern, in match order, found in `bytes`.
    ///
    /// Stops at the first match; returns `None` when nothing matches.
    pub fn classify(&self, bytes: &[u8]) -> Option<&str> {
        (0..self.entries.len())
            .find(|&index| self.test(index, bytes))
            .map(|index| &*self.entries[index].type_name)
    }
}

/// Classifies `bytes` against `database` without keeping the compiled patterns.
pub fn classify<'a>(bytes: &[u8], database: &'a PatternDatabase, algorithm: Algorithm) -> Option<&'a str> {
    database
        .match_order()
        .find(|pattern| crate::search::contains(algorithm, bytes, &pattern.signature))
        .map(|pattern| pattern.type_name.as_str())
}
