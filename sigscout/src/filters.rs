use glob::Pattern;
use std::path::Path;
use tracing::{trace, warn};

/// Compiles ignore globs, dropping (and logging) any that do not parse
pub fn compile_ignore_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("Ignoring invalid glob '{}': {}", p, e);
                None
            }
        })
        .collect()
}

/// Checks if a file should be left out of the scan.
///
/// Globs are matched against the path relative to `root` and against the
/// bare file name, so both `"*.log"` and `"cache/**"` behave as expected.
pub fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[Pattern]) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let file_name = path.file_name().map(Path::new);

    let ignored = ignore_patterns.iter().any(|pattern| {
        pattern.matches_path(relative) || file_name.is_some_and(|name| pattern.matches_path(name))
    });
    if ignored {
        trace!("Ignoring {}", path.display());
    }
    ignored
}
