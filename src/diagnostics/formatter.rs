use super::diagnostic::Diagnostic;
use std::fs;
use std::path::Path;

/// Format diagnostics one per line:
///
/// ```text
/// src/app.php:10:5: error: undefined variable $user
/// ```
pub fn format_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|diagnostic| {
            format!(
                "{}:{}:{}: {}: {}",
                diagnostic.location.file.display(),
                diagnostic.location.line,
                diagnostic.location.column,
                diagnostic.level.as_str(),
                diagnostic.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format diagnostics with the offending source line and a caret:
///
/// ```text
/// src/app.php:10:5: error: undefined variable $user
///    echo $user;
///         ^^^^^
/// ```
pub fn format_diagnostics_with_source(diagnostics: &[Diagnostic], source: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();

    diagnostics
        .iter()
        .map(|diagnostic| {
            let mut output = format!(
                "{}:{}:{}: {}: {}",
                diagnostic.location.file.display(),
                diagnostic.location.line,
                diagnostic.location.column,
                diagnostic.level.as_str(),
                diagnostic.message
            );

            if diagnostic.location.line > 0 && diagnostic.location.line <= lines.len() {
                let source_line = lines[diagnostic.location.line - 1];
                let column = diagnostic.location.column.saturating_sub(1);
                let carets = diagnostic.location.length.unwrap_or(1).max(1);

                output.push_str("\n   ");
                output.push_str(source_line);
                output.push_str("\n   ");
                output.push_str(&" ".repeat(column));
                output.push_str(&"^".repeat(carets));
            }

            output
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Read the source file and format with snippets, falling back to the
/// plain format when the file is unreadable.
pub fn format_diagnostics_with_file(diagnostics: &[Diagnostic], file: &Path) -> String {
    match fs::read_to_string(file) {
        Ok(source) => format_diagnostics_with_source(diagnostics, &source),
        Err(_) => format_diagnostics(diagnostics),
    }
}
