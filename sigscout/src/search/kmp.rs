//! Knuth-Morris-Pratt substring search.
//!
//! The prefix function of a signature is built once in O(m) and reused for
//! every file the signature is tested against. Scanning is a single pass over
//! the haystack: on a mismatch the needle cursor falls back through the
//! prefix table and the haystack cursor never moves backwards, so the whole
//! search is O(n + m).

/// Computes the prefix function of `pattern`.
///
/// `prefix[i]` is the length of the longest proper prefix of `pattern[..=i]`
/// that is also a suffix of it. The table has the same length as the pattern.
pub fn prefix_function(pattern: &[u8]) -> Vec<usize> {
    let mut prefix = vec![0; pattern.len()];
    let mut border = 0;

    for i in 1..pattern.len() {
        while border > 0 && pattern[i] != pattern[border] {
            border = prefix[border - 1];
        }
        if pattern[i] == pattern[border] {
            border += 1;
        }
        prefix[i] = border;
    }
    prefix
}

/// A signature compiled for KMP search.
#[derive(Debug, Clone)]
pub struct KmpSearcher {
    needle: Vec<u8>,
    prefix: Vec<usize>,
}

impl KmpSearcher {
    pub fn new(needle: &[u8]) -> Self {
        Self {
            needle: needle.to_vec(),
            prefix: prefix_function(needle),
        }
    }

    /// The prefix table built for this signature
    pub fn prefix_table(&self) -> &[usize] {
        &self.prefix
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

        let mut matched = 0;
        for (i, &byte) in haystack.iter().enumerate() {
            while matched > 0 && byte != self.needle[matched] {
                matched = self.prefix[matched - 1];
            }
            if byte == self.needle[matched] {
                matched += 1;
            }
            if matched == m {
                return Some(i + 1 - m);
            }
        }
        None
    }

    pub fn is_found_in(&self, haystack: &[u8]) -> bool {
        self.find(haystack).is_some()
    }
}

/// One-shot KMP search; builds the prefix table for `needle` on every call.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    KmpSearcher::new(needle).is_found_in(haystack)
}
