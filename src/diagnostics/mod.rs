//! Diagnostics: recoverable resolution issues and their user-facing
//! presentation.

mod diagnostic;
mod formatter;
mod issue;

pub use diagnostic::{Diagnostic, DiagnosticLevel, Location};
pub use formatter::{format_diagnostics, format_diagnostics_with_file, format_diagnostics_with_source};
pub use issue::Issue;
