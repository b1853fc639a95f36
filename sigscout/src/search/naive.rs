//! Brute-force substring search.
//!
//! Tries every start offset and compares byte by byte, giving up on an offset
//! at the first mismatch. O(n·m) in the worst case, but with no setup cost it
//! is often the fastest choice for short signatures.

/// Returns the offset of the first occurrence of `needle` in `haystack`.
///
/// An empty needle matches at offset 0.
pub fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }

    'offsets: for start in 0..=haystack.len() - needle.len() {
        for (j, &expected) in needle.iter().enumerate() {
            if haystack[start + j] != expected {
                continue 'offsets;
            }
        }
        return Some(start);
    }
    None
}

/// Returns true if `needle` occurs anywhere in `haystack`.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}
