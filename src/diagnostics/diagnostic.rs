use std::path::{Path, PathBuf};

use crate::diagnostics::Issue;

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
}

impl DiagnosticLevel {
    pub fn as_str(&self) -> &str {
        match self {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
        }
    }
}

/// Source code location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub length: Option<usize>,
}

impl Location {
    pub fn line_start(file: &Path, line: usize) -> Self {
        Self {
            file: file.to_path_buf(),
            line,
            column: 1,
            length: None,
        }
    }
}

/// A user-facing finding
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub location: Location,
    pub level: DiagnosticLevel,
    pub message: String,
    pub code: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic
    pub fn error(location: Location, message: String) -> Self {
        Self {
            location,
            level: DiagnosticLevel::Error,
            message,
            code: None,
        }
    }

    /// Create a warning diagnostic
    pub fn warning(location: Location, message: String) -> Self {
        Self {
            location,
            level: DiagnosticLevel::Warning,
            message,
            code: None,
        }
    }

    /// Present a resolution issue against the file it came from.
    pub fn from_issue(file: &Path, issue: &Issue) -> Self {
        Self::error(
            Location::line_start(file, issue.line() as usize),
            issue.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_from_issue() {
        let issue = Issue::UndefinedVariable {
            name: "config".to_string(),
            line: 12,
        };

        let diagnostic = Diagnostic::from_issue(Path::new("app.php"), &issue);
        assert_eq!(diagnostic.level, DiagnosticLevel::Error);
        assert_eq!(diagnostic.location.line, 12);
        assert_eq!(diagnostic.message, "undefined variable $config");
    }

    #[test]
    fn test_warning_constructor() {
        let diagnostic = Diagnostic::warning(
            Location::line_start(Path::new("app.php"), 4),
            "unused import".to_string(),
        );
        assert_eq!(diagnostic.level, DiagnosticLevel::Warning);
        assert_eq!(diagnostic.location.column, 1);
    }
}
