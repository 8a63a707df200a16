//! File Checker - the cast-assertion conformance harness
//!
//! Checks `.types` assertion files against the cast relation. Each
//! non-comment line asserts one cast:
//!
//! ```text
//! # int widens to float, never the reverse
//! int -> float
//! float !-> int
//! int|string -> float
//! ```
//!
//! `lhs -> rhs` expects the left union to cast to the right one;
//! `lhs !-> rhs` expects it not to. Every file is checked in its own
//! isolated session, so directory runs parallelize per file.

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::diagnostics::{Diagnostic, Location};
use crate::env::GlobalEnv;
use crate::signatures::SignatureMaps;
use crate::types::{TypePool, UnionType};

/// Extension assertion files are discovered by in directory mode.
pub const ASSERTION_EXTENSION: &str = "types";

/// Checks assertion files against the cast relation.
pub struct FileChecker {
    signatures: SignatureMaps,
}

impl FileChecker {
    /// A checker over the embedded signature tables.
    pub fn new() -> Self {
        Self {
            signatures: SignatureMaps::internal(),
        }
    }

    /// A checker that loads the signature tables through the on-disk
    /// cache.
    pub fn with_cached_signatures() -> Self {
        Self {
            signatures: crate::cache::load_or_rebuild(),
        }
    }

    /// Check a single assertion file.
    pub fn check_file(&self, path: &Path) -> Result<Vec<Diagnostic>> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(self.check_source(&source, path))
    }

    /// Check assertion source in a fresh session.
    pub fn check_source(&self, source: &str, file: &Path) -> Vec<Diagnostic> {
        let mut genv = GlobalEnv::new();
        genv.signatures = self.signatures.clone();

        let mut diagnostics = Vec::new();
        for (index, raw_line) in source.lines().enumerate() {
            let line_number = index + 1;
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            let location = Location::line_start(file, line_number);
            match parse_assertion(line) {
                Some((lhs, rhs, expect_castable)) => {
                    let Some(from) = parse_union(&mut genv.pool, lhs) else {
                        diagnostics
                            .push(Diagnostic::warning(location, malformed_message(lhs)));
                        continue;
                    };
                    let Some(to) = parse_union(&mut genv.pool, rhs) else {
                        diagnostics
                            .push(Diagnostic::warning(location, malformed_message(rhs)));
                        continue;
                    };

                    let castable = from.can_cast_to_union_type(&to, &genv.pool);
                    if castable != expect_castable {
                        let message = if expect_castable {
                            format!(
                                "{} cannot cast to {}",
                                from.show(&genv.pool),
                                to.show(&genv.pool)
                            )
                        } else {
                            format!(
                                "{} unexpectedly casts to {}",
                                from.show(&genv.pool),
                                to.show(&genv.pool)
                            )
                        };
                        diagnostics.push(Diagnostic::error(location, message));
                    }
                }
                None => {
                    diagnostics.push(Diagnostic::warning(
                        location,
                        format!("cannot parse assertion: {}", line),
                    ));
                }
            }
        }

        diagnostics
    }

    /// Check every assertion file under a directory, one isolated
    /// session per file, in parallel.
    pub fn check_directory(&self, root: &Path) -> Result<Vec<Diagnostic>> {
        let files: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry.path().extension().and_then(|e| e.to_str())
                        == Some(ASSERTION_EXTENSION)
            })
            .map(|entry| entry.into_path())
            .collect();

        let mut diagnostics: Vec<Diagnostic> = files
            .par_iter()
            .map(|path| self.check_file(path))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();

        diagnostics.sort_by(|a, b| {
            (&a.location.file, a.location.line).cmp(&(&b.location.file, b.location.line))
        });
        Ok(diagnostics)
    }
}

impl Default for FileChecker {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(position) => &line[..position],
        None => line,
    }
}

/// Split an assertion line into (lhs, rhs, expect_castable).
fn parse_assertion(line: &str) -> Option<(&str, &str, bool)> {
    if let Some((lhs, rhs)) = line.split_once("!->") {
        return Some((lhs.trim(), rhs.trim(), false));
    }
    if let Some((lhs, rhs)) = line.split_once("->") {
        return Some((lhs.trim(), rhs.trim(), true));
    }
    None
}

fn malformed_message(side: &str) -> String {
    format!("malformed type string: {:?}", side)
}

/// Parse one side of an assertion, refusing anything the type
/// constructors would reject.
fn parse_union(pool: &mut TypePool, union_string: &str) -> Option<UnionType> {
    if union_string.is_empty() {
        return None;
    }
    for segment in union_string.split('|') {
        if !valid_type_segment(segment.trim()) {
            return None;
        }
    }
    Some(UnionType::from_fully_qualified_string(pool, union_string))
}

fn valid_type_segment(segment: &str) -> bool {
    let mut base = segment;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped;
    }
    if base.is_empty() || base.ends_with('\\') {
        return false;
    }
    if !base
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '\\' || c == '_')
    {
        return false;
    }
    base.starts_with('\\') || TypePool::is_internal_type_name(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticLevel;
    use std::fs;

    #[test]
    fn test_passing_assertions_produce_no_diagnostics() {
        let checker = FileChecker::new();
        let source = "\
# numeric widening
int -> float
float !-> int
int|string -> float
\\App\\Child !-> \\App\\Unrelated
";
        let diagnostics = checker.check_source(source, Path::new("casts.types"));
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
    }

    #[test]
    fn test_failing_assertion_is_reported_with_line() {
        let checker = FileChecker::new();
        let source = "float -> int\n";

        let diagnostics = checker.check_source(source, Path::new("casts.types"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].level, DiagnosticLevel::Error);
        assert_eq!(diagnostics[0].location.line, 1);
        assert!(diagnostics[0].message.contains("cannot cast"));
    }

    #[test]
    fn test_negative_assertion_failure() {
        let checker = FileChecker::new();
        let source = "int !-> float\n";

        let diagnostics = checker.check_source(source, Path::new("casts.types"));
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("unexpectedly casts"));
    }

    #[test]
    fn test_malformed_lines_are_warnings() {
        let checker = FileChecker::new();
        let source = "int => float\nNotAType -> int\n";

        let diagnostics = checker.check_source(source, Path::new("casts.types"));
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics
            .iter()
            .all(|d| d.level == DiagnosticLevel::Warning));
    }

    #[test]
    fn test_directory_check_finds_assertion_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pass.types"), "int -> float\n").unwrap();
        fs::write(dir.path().join("fail.types"), "float -> int\n").unwrap();
        fs::write(dir.path().join("ignored.txt"), "float -> int\n").unwrap();

        let checker = FileChecker::new();
        let diagnostics = checker.check_directory(dir.path()).unwrap();

        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0]
            .location
            .file
            .to_string_lossy()
            .ends_with("fail.types"));
    }
}
