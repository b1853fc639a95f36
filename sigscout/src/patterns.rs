/// Pattern database: the ordered list of signatures a scan classifies with.
///
/// # Format
///
/// One record per line:
/// ```text
/// 1;"%PDF-";"PDF document"
/// 2;"PK\x03\x04";"Zip archive"
/// ```
/// The signature sits between the first `"` after the priority and the last
/// `";"` separator, so it may itself contain `;` or `"`. Its bytes are taken
/// literally; no escape sequences are interpreted. Blank lines are skipped.
///
/// # Ordering
///
/// Load order runs from generic to specific. Patterns are *matched* in reverse
/// load order, so the last declared pattern is tried first. The numeric
/// priority is parsed and kept but never used to reorder patterns.
///
/// # Errors
///
/// Loading is fail-fast: the first malformed line aborts the load with
/// [`ScanError::MalformedPatternEntry`] naming the 1-based line number.
use serde::Serialize;
use std::path::Path;
use tracing::{debug, trace};

use crate::errors::{ScanError, ScanResult};

/// One signature record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pattern {
    /// Priority as written in the database (informational only)
    pub priority: i64,
    /// Byte sequence whose presence identifies the type
    pub signature: Vec<u8>,
    /// Name reported for files containing the signature
    pub type_name: String,
}

impl Pattern {
    pub fn new(priority: i64, signature: impl Into<Vec<u8>>, type_name: impl Into<String>) -> Self {
        Self {
            priority,
            signature: signature.into(),
            type_name: type_name.into(),
        }
    }
}

/// Patterns in load order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternDatabase {
    patterns: Vec<Pattern>,
}

impl PatternDatabase {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds a database from patterns given in load order
    pub fn from_patterns(patterns: Vec<Pattern>) -> Self {
        Self { patterns }
    }

    /// A database holding a single signature, as used by `check`
    pub fn single(signature: impl Into<Vec<u8>>, type_name: impl Into<String>) -> Self {
        Self::from_patterns(vec![Pattern::new(0, signature, type_name)])
    }

    /// Reads and parses a database file
    pub fn load(path: &Path) -> ScanResult<Self> {
        debug!("Loading pattern database from {}", path.display());
        let bytes = std::fs::read(path).map_err(|e| ScanError::unreadable_file(path, e))?;
        let database = Self::parse(&bytes)?;
        debug!("Loaded {} patterns", database.len());
        Ok(database)
    }

    /// Parses database text, failing on the first malformed line
    pub fn parse(source: &[u8]) -> ScanResult<Self> {
        let mut patterns = Vec::new();
        for (index, raw_line) in source.split(|&b| b == b'\n').enumerate() {
            let line = raw_line.strip_suffix(b"\r").unwrap_or(raw_line);
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let pattern = parse_line(line, index + 1)?;
            trace!(
                "Line {}: priority {} -> {}",
                index + 1,
                pattern.priority,
                pattern.type_name
            );
            patterns.push(pattern);
        }
        Ok(Self { patterns })
    }

    /// Adds a pattern after all existing ones, so it is matched first
    pub fn push(&mut self, pattern: Pattern) {
        self.patterns.push(pattern);
    }

    /// Patterns in the order they were loaded
    pub fn load_order(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Patterns in the order they are tried: last loaded first
    pub fn match_order(&self) -> impl DoubleEndedIterator<Item = &Pattern> + ExactSizeIterator {
        self.patterns.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

fn parse_line(line: &[u8], line_number: usize) -> ScanResult<Pattern> {
    let malformed = |reason: &str| ScanError::malformed_entry(line_number, reason);

    let separator = line
        .iter()
        .position(|&b| b == b';')
        .ok_or_else(|| malformed("expected priority;\"signature\";\"type name\""))?;
    let (priority_field, rest) = (&line[..separator], &line[separator + 1..]);

    let priority = std::str::from_utf8(priority_field)
        .ok()
        .map(str::trim)
        .and_then(|p| p.parse::<i64>().ok())
        .ok_or_else(|| malformed("priority is not an integer"))?;

    let quoted = rest
        .strip_prefix(b"\"")
        .and_then(|r| r.strip_suffix(b"\""))
        .ok_or_else(|| malformed("signature and type name must be quoted"))?;

    // The type name is the text after the last `";"`; everything before it,
    // quotes and semicolons included, belongs to the signature.
    let split = quoted
        .windows(3)
        .rposition(|w| w == b"\";\"")
        .ok_or_else(|| malformed("missing type name"))?;
    let signature = &quoted[..split];
    let type_name = std::str::from_utf8(&quoted[split + 3..])
        .map_err(|_| malformed("type name is not valid UTF-8"))?;

    if type_name.is_empty() {
        return Err(malformed("type name is empty"));
    }

    Ok(Pattern::new(priority, signature, type_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_records_in_load_order() {
        let db = PatternDatabase::parse(b"0;\"AB\";\"TypeX\"\n0;\"CD\";\"TypeY\"\n").unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.load_order()[0], Pattern::new(0, "AB", "TypeX"));
        assert_eq!(db.load_order()[1], Pattern::new(0, "CD", "TypeY"));
    }

    #[test]
    fn test_match_order_is_reverse_load_order() {
        let db = PatternDatabase::parse(b"1;\"A\";\"A\"\n2;\"B\";\"B\"\n3;\"C\";\"C\"").unwrap();
        let names: Vec<_> = db.match_order().map(|p| p.type_name.as_str()).collect();
        assert_eq!(names, vec!["C", "B", "A"]);
    }

    #[test]
    fn test_priority_is_not_used_for_ordering() {
        let db = PatternDatabase::parse(b"10;\"high\";\"High\"\n1;\"low\";\"Low\"").unwrap();
        assert_eq!(db.match_order().next().unwrap().type_name, "Low");
        assert_eq!(db.load_order()[0].priority, 10);
    }

    #[test]
    fn test_signature_passes_through_delimiters() {
        let db = PatternDatabase::parse(b"5;\"a;b\"c\";\"Odd type\"").unwrap();
        let pattern = &db.load_order()[0];
        assert_eq!(pattern.signature, b"a;b\"c");
        assert_eq!(pattern.type_name, "Odd type");
    }

    #[test]
    fn test_signature_bytes_are_not_unescaped() {
        let db = PatternDatabase::parse(br#"1;"\x00\n";"Raw""#).unwrap();
        assert_eq!(db.load_order()[0].signature, br"\x00\n");
    }

    #[test]
    fn test_non_utf8_signature() {
        let db = PatternDatabase::parse(b"1;\"\xff\xd8\xff\";\"JPEG image\"").unwrap();
        assert_eq!(db.load_order()[0].signature, vec![0xff, 0xd8, 0xff]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let db = PatternDatabase::parse(b"1;\"A\";\"TypeA\"\r\n\r\n  \n2;\"B\";\"TypeB\"\r\n").unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.load_order()[1].type_name, "TypeB");
    }

    #[test]
    fn test_negative_and_padded_priority() {
        let db = PatternDatabase::parse(b" -3 ;\"A\";\"TypeA\"").unwrap();
        assert_eq!(db.load_order()[0].priority, -3);
    }

    #[test]
    fn test_empty_signature_is_accepted() {
        let db = PatternDatabase::parse(b"1;\"\";\"Anything\"").unwrap();
        assert!(db.load_order()[0].signature.is_empty());
    }

    #[test]
    fn test_malformed_lines_fail_fast() {
        let cases: &[(&[u8], usize)] = &[
            (b"1;\"A\";\"TypeA\"\nnot a record", 2),
            (b"x;\"A\";\"TypeA\"", 1),
            (b"1;A;TypeA", 1),
            (b"1;\"A\"", 1),
            (b"1;\"A\";\"\"", 1),
            (b"\n\n1;\"A\";\"TypeA", 3),
        ];
        for (source, expected_line) in cases {
            match PatternDatabase::parse(source) {
                Err(ScanError::MalformedPatternEntry { line, .. }) => {
                    assert_eq!(line, *expected_line, "source {:?}", source)
                }
                other => panic!("expected malformed entry for {:?}, got {:?}", source, other),
            }
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0;\"%PDF-\";\"PDF document\"").unwrap();
        writeln!(file, "1;\"PK\";\"Zip archive\"").unwrap();

        let db = PatternDatabase::load(file.path()).unwrap();
        assert_eq!(db.len(), 2);
        assert_eq!(db.match_order().next().unwrap().type_name, "Zip archive");
    }

    #[test]
    fn test_load_missing_file() {
        let result = PatternDatabase::load(Path::new("does/not/exist.db"));
        assert!(matches!(result, Err(ScanError::UnreadableFile { .. })));
    }

    #[test]
    fn test_single_and_push() {
        let mut db = PatternDatabase::single("A", "TypeA");
        db.push(Pattern::new(1, "B", "TypeB"));
        assert_eq!(db.match_order().next().unwrap().type_name, "TypeB");
        assert!(!db.is_empty());
    }
}
