//! Issue - recoverable resolution failures
//!
//! The expected failure mode for a partially-analyzed, dynamically-typed
//! codebase: a name that cannot be resolved. Callers either surface an
//! issue as a diagnostic or swallow it into the empty union type;
//! analysis never aborts for one.

use thiserror::Error;

/// A reference that could not be resolved.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Issue {
    #[error("undefined variable ${name}")]
    UndefinedVariable { name: String, line: u32 },

    #[error("call to undefined function {name}()")]
    UndefinedFunction { name: String, line: u32 },

    #[error("reference to undefined class {fqsen}")]
    UndefinedClass { fqsen: String, line: u32 },

    #[error("call to undefined method {class}::{method}()")]
    UndefinedMethod {
        class: String,
        method: String,
        line: u32,
    },

    #[error("reference to undefined property {class}::${property}")]
    UndefinedProperty {
        class: String,
        property: String,
        line: u32,
    },
}

impl Issue {
    pub fn line(&self) -> u32 {
        match self {
            Issue::UndefinedVariable { line, .. }
            | Issue::UndefinedFunction { line, .. }
            | Issue::UndefinedClass { line, .. }
            | Issue::UndefinedMethod { line, .. }
            | Issue::UndefinedProperty { line, .. } => *line,
        }
    }
}
