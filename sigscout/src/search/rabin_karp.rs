//! Rabin-Karp substring search over a rolling polynomial hash.
//!
//! The window hash is `sum(window[k] * BASE^(len - 1 - k)) mod MODULUS`.
//! Sliding the window by one byte removes the leaving byte's term and appends
//! the entering byte in O(1). Hash equality only nominates a candidate; every
//! candidate is confirmed with a byte-exact comparison.

/// Default polynomial base; one more than the byte alphabet.
pub const DEFAULT_BASE: u64 = 257;
/// Default modulus, a prime below 2^30 so `hash * base` stays well inside u64.
pub const DEFAULT_MODULUS: u64 = 1_000_000_007;

/// Asserts that `base` and `modulus` keep every intermediate product in u64.
///
/// The largest products are `hash * base` and `byte * weight`, both bounded by
/// `modulus * max(base, 256)`.
fn check_params(base: u64, modulus: u64) {
    assert!(modulus > 0, "rolling hash modulus must be positive");
    assert!(
        modulus
            .checked_mul(base.max(256))
            .and_then(|product| product.checked_add(256))
            .is_some(),
        "rolling hash base {} and modulus {} overflow u64",
        base,
        modulus
    );
}

/// Hash of `bytes` computed from scratch.
pub fn polynomial_hash(bytes: &[u8], base: u64, modulus: u64) -> u64 {
    bytes
        .iter()
        .fold(0, |hash, &b| (hash * base + u64::from(b)) % modulus)
}

/// Hash state of a fixed-length window sliding over a byte buffer.
///
/// `hash` always equals `polynomial_hash` of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingHash {
    hash: u64,
    base: u64,
    modulus: u64,
    window_length: usize,
    // BASE^(window_length - 1) mod MODULUS, the weight of the leaving byte
    leading_weight: u64,
}

impl RollingHash {
    /// Starts a rolling hash over `window` with the default parameters.
    pub fn new(window: &[u8]) -> Self {
        Self::with_params(window, DEFAULT_BASE, DEFAULT_MODULUS)
    }

    /// # Panics
    ///
    /// Panics if `modulus` is zero or `modulus * max(base, 256)` does not fit in u64.
    pub fn with_params(window: &[u8], base: u64, modulus: u64) -> Self {
        check_params(base, modulus);
        let leading_weight = (1..window.len()).fold(1 % modulus, |w, _| (w * base) % modulus);
        Self {
            hash: polynomial_hash(window, base, modulus),
            base,
            modulus,
            window_length: window.len(),
            leading_weight,
        }
    }

    pub fn value(&self) -> u64 {
        self.hash
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    /// Slides the window one byte: `leaving` drops off the front and
    /// `entering` is appended at the back.
    pub fn roll(&mut self, leaving: u8, entering: u8) {
        let removed = (u64::from(leaving) * self.leading_weight) % self.modulus;
        // Adding the modulus first keeps the subtraction in [0, modulus).
        let without_leading = (self.hash + self.modulus - removed) % self.modulus;
        self.hash = (without_leading * self.base + u64::from(entering)) % self.modulus;
    }
}

/// A signature compiled for Rabin-Karp search.
#[derive(Debug, Clone)]
pub struct RabinKarpSearcher {
    needle: Vec<u8>,
    needle_hash: u64,
    base: u64,
    modulus: u64,
}

impl RabinKarpSearcher {
    pub fn new(needle: &[u8]) -> Self {
        Self::with_params(needle, DEFAULT_BASE, DEFAULT_MODULUS)
    }

    /// Builds a searcher with a custom base and modulus. Small moduli are
    /// useful to force hash collisions in tests.
    ///
    /// # Panics
    ///
    /// Panics if `modulus` is zero or `modulus * max(base, 256)` does not fit in u64.
    pub fn with_params(needle: &[u8], base: u64, modulus: u64) -> Self {
        check_params(base, modulus);
        Self {
            needle: needle.to_vec(),
            needle_hash: polynomial_hash(needle, base, modulus),
            base,
            modulus,
        }
    }

    pub fn needle(&self) -> &[u8] {
        &self.needle
    }

    /// Returns the offset of the first occurrence of the signature in `haystack`.
    pub fn find(&self, haystack: &[u8]) -> Option<usize> {
        let m = self.needle.len();
        if m == 0 {
            return Some(0);
        }
        if m > haystack.len() {
            return None;
        }

        let mut window = RollingHash::with_params(&haystack[..m], self.base, self.modulus);
        let last_start = haystack.len() - m;
        for start in 0..=last_start {
            if window.value() == self.needle_hash && haystack[start..start + m] == self.needle[..] {
                return Some(start);
            }
            if start < last_start {
                window.roll(haystack[start], haystack[start + m]);
            }
        }
        None
    }

    pub fn is_found_in(&self, haystack: &[u8]) -> bool {
        self.find(haystack).is_some()
    }
}

/// One-shot Rabin-Karp search with the default parameters.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    RabinKarpSearcher::new(needle).is_found_in(haystack)
}
