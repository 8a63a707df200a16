//! TypeRay - Union-type inference core for PHP static analysis
//!
//! This crate provides the type representation and type inference engine:
//! interned concrete types, union types, lexical contexts, fully-qualified
//! symbol names, and the cast-compatibility relation between union types.

pub mod analyzer;
pub mod ast;
pub mod cache;
pub mod codebase;
pub mod diagnostics;
pub mod env;
pub mod fqsen;
pub mod signatures;
pub mod types;

#[cfg(feature = "cli")]
pub mod checker;
