//! Exact substring search over raw byte buffers.
//!
//! Three interchangeable algorithms answer the same question, "does this
//! signature occur anywhere in these bytes?", and must agree on every input:
//!
//! 1. **Naive**: compare at every offset, abandoning an offset on the first
//!    mismatching byte. O(n·m) worst case, no setup.
//! 2. **Knuth-Morris-Pratt**: precompute the prefix function of the signature,
//!    then scan the haystack once without ever stepping back. O(n + m).
//! 3. **Rabin-Karp**: compare rolling polynomial hashes of each window with the
//!    signature hash and confirm candidates byte for byte. O(n + m) expected.
//!
//! Per-signature state (prefix table, signature hash) lives in a
//! [`SignatureMatcher`], which is built once per pattern and then shared
//! read-only across all worker threads:
//! ```rust,ignore
//! let matcher = SignatureMatcher::compile(Algorithm::Kmp, b"%PDF-");
//! let is_pdf = matcher.is_found_in(&bytes);
//! ```
//!
//! # Edge cases
//!
//! - An empty signature matches every buffer, including an empty one.
//! - A signature longer than the buffer never matches and the buffer is not
//!   scanned.

pub mod kmp;
pub mod matcher;
pub mod naive;
pub mod rabin_karp;

pub use matcher::{contains, Algorithm, SignatureMatcher};
