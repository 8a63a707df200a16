//! Literal Handlers - types of literal expressions
//!
//! Note: array literals are handled in dispatch.rs because they need
//! child processing for element type inference.

use crate::ast::NodeKind;
use crate::types::{TypePool, UnionType};

/// Union type of a scalar literal node, or None for non-literals.
pub fn literal_union_type(pool: &TypePool, kind: &NodeKind) -> Option<UnionType> {
    let name = match kind {
        NodeKind::IntLiteral(_) => "int",
        NodeKind::FloatLiteral(_) => "float",
        NodeKind::StringLiteral(_) => "string",
        NodeKind::BoolLiteral(_) => "bool",
        NodeKind::NullLiteral => "null",
        _ => return None,
    };
    Some(UnionType::empty().with_type(pool.from_internal_type_name(name)))
}
