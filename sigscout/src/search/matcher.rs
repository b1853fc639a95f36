use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::kmp::KmpSearcher;
use super::naive;
use super::rabin_karp::RabinKarpSearcher;
use crate::errors::ScanError;

/// Exact-match algorithm used to look for signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    Naive,
    Kmp,
    #[default]
    RabinKarp,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Naive, Algorithm::Kmp, Algorithm::RabinKarp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Naive => "naive",
            Algorithm::Kmp => "kmp",
            Algorithm::RabinKarp => "rabin-karp",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "naive" => Ok(Algorithm::Naive),
            "kmp" => Ok(Algorithm::Kmp),
            "rabin-karp" | "rabinkarp" | "rk" => Ok(Algorithm::RabinKarp),
            other => Err(ScanError::invalid_arguments(format!(
                "unknown algorithm '{}' (expected naive, kmp or rabin-karp)",
                other
            ))),
        }
    }
}

/// A signature with whatever per-pattern state its algorithm needs.
///
/// Built once per pattern and shared read-only by every worker.
#[derive(Debug, Clone)]
pub enum SignatureMatcher {
    Naive(Vec<u8>),
    Kmp(KmpSearcher),
    RabinKarp(RabinKarpSearcher),
}

impl SignatureMatcher {
    pub fn compile(algorithm: Algorithm, signature: &[u8]) -> Self {
        match algorithm {
            Algorithm::Naive => SignatureMatcher::Naive(signature.to_vec()),
            Algorithm::Kmp => SignatureMatcher::Kmp(KmpSearcher::new(signature)),
            Algorithm::RabinKarp => SignatureMatcher::RabinKarp(RabinKarpSearcher::new(signature)),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            SignatureMatcher::Naive(_) => Algorithm::Naive,
            SignatureMatcher::Kmp(_) => Algorithm::Kmp,
            SignatureMatcher::RabinKarp(_) => Algorithm::RabinKarp,
        }
    }

    pub fn signature(&self) -> &[u8] {
        match self {
            SignatureMatcher::Naive(needle) => needle,
            SignatureMatcher::Kmp(searcher) => searcher.needle(),
            SignatureMatcher::RabinKarp(searcher) => searcher.needle(),
        }
    }

    pub fn find(&self, haystack: &[u8]) -> Option<usize> {
        match self {
            SignatureMatcher::Naive(needle) => naive::find(haystack, needle),
            SignatureMatcher::Kmp(searcher) => searcher.find(haystack),
            SignatureMatcher::RabinKarp(searcher) => searcher.find(haystack),
        }
    }

    pub fn is_found_in(&self, haystack: &[u8]) -> bool {
        self.find(haystack).is_some()
    }
}

/// Returns true iff `needle` occurs contiguously in `haystack`.
///
/// All algorithms agree on every input; an empty needle always matches.
pub fn contains(algorithm: Algorithm, haystack: &[u8], needle: &[u8]) -> bool {
    match algorithm {
        Algorithm::Naive => naive::contains(haystack, needle),
        Algorithm::Kmp => super::kmp::contains(haystack, needle),
        Algorithm::RabinKarp => super::rabin_karp::contains(haystack, needle),
    }
}
