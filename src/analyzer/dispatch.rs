//! Node Dispatch - resolve an AST node to a union type
//!
//! The single entry point pattern-matches the node kind and hands off to
//! the literal, variable, and call handlers. Branch alternatives (the
//! arms of a ternary) accumulate into one union; arithmetic follows the
//! runtime's numeric rules.

use crate::ast::{BinaryOperator, Node, NodeKind};
use crate::codebase::CodeBase;
use crate::diagnostics::Issue;
use crate::env::Context;
use crate::signatures::SignatureMaps;
use crate::types::{TypePool, UnionType};

use super::calls::{
    call_union_type, method_call_union_type, new_union_type, property_union_type,
    static_call_union_type,
};
use super::literals::literal_union_type;
use super::variables::{assign_variable, variable_union_type};

/// Resolve one expression node to a union type. Unresolvable references
/// surface as issues; the caller decides whether to swallow them into
/// the empty union.
pub fn node_union_type(
    pool: &mut TypePool,
    codebase: &dyn CodeBase,
    signatures: &SignatureMaps,
    context: &mut Context,
    node: &Node,
) -> Result<UnionType, Issue> {
    if let Some(union) = literal_union_type(pool, &node.kind) {
        return Ok(union);
    }

    match &node.kind {
        NodeKind::ArrayLiteral(elements) => {
            let mut element_union = UnionType::empty();
            for element in elements {
                let ty = node_union_type(pool, codebase, signatures, context, element)?;
                element_union.add_union_type(&ty);
            }
            if element_union.is_empty() {
                Ok(UnionType::empty().with_type(pool.from_internal_type_name("array")))
            } else {
                Ok(element_union.as_generic_array_types(pool))
            }
        }

        NodeKind::Variable(name) => variable_union_type(context, name, node),

        NodeKind::Assignment { variable, value } => {
            let ty = node_union_type(pool, codebase, signatures, context, value)?;
            assign_variable(context, variable, ty.clone());
            Ok(ty)
        }

        NodeKind::BinaryOp {
            operator,
            left,
            right,
        } => {
            let left = node_union_type(pool, codebase, signatures, context, left)?;
            let right = node_union_type(pool, codebase, signatures, context, right)?;
            Ok(binary_op_union_type(pool, *operator, &left, &right))
        }

        NodeKind::Conditional {
            condition,
            if_true,
            if_false,
        } => {
            node_union_type(pool, codebase, signatures, context, condition)?;
            // One branch's type per alternative, accumulated.
            let mut union = node_union_type(pool, codebase, signatures, context, if_true)?;
            let other = node_union_type(pool, codebase, signatures, context, if_false)?;
            union.add_union_type(&other);
            Ok(union)
        }

        NodeKind::Call { function, args } => {
            for arg in args {
                node_union_type(pool, codebase, signatures, context, arg)?;
            }
            call_union_type(pool, codebase, signatures, context, function, node.line)
        }

        NodeKind::MethodCall {
            object,
            method,
            args,
        } => {
            let object_type = node_union_type(pool, codebase, signatures, context, object)?;
            for arg in args {
                node_union_type(pool, codebase, signatures, context, arg)?;
            }
            method_call_union_type(pool, codebase, &object_type, method, node.line)
        }

        NodeKind::StaticCall {
            class,
            method,
            args,
        } => {
            for arg in args {
                node_union_type(pool, codebase, signatures, context, arg)?;
            }
            static_call_union_type(codebase, context, class, method, node.line)
        }

        NodeKind::PropertyAccess { object, property } => {
            let object_type = node_union_type(pool, codebase, signatures, context, object)?;
            property_union_type(pool, codebase, signatures, &object_type, property, node.line)
        }

        NodeKind::New { class, args } => {
            for arg in args {
                node_union_type(pool, codebase, signatures, context, arg)?;
            }
            new_union_type(pool, context, class, node.line)
        }

        // Scalar literals were handled above.
        _ => Ok(UnionType::empty()),
    }
}

fn contains_name(pool: &TypePool, union: &UnionType, name: &str) -> bool {
    union.type_ids().iter().any(|&id| pool.name(id) == name)
}

fn is_exactly(pool: &TypePool, union: &UnionType, name: &str) -> bool {
    matches!(union.type_ids(), [only] if pool.name(*only) == name)
}

fn is_all_arrays(pool: &TypePool, union: &UnionType) -> bool {
    !union.is_empty()
        && union
            .type_ids()
            .iter()
            .all(|&id| pool.name(id) == "array" || pool.is_generic(id))
}

/// Typing rules for binary operators: comparisons and boolean logic are
/// bool, `.` is string, `+` over two arrays is the array union, and the
/// numeric operators follow int/float widening (`/` may produce either).
fn binary_op_union_type(
    pool: &TypePool,
    operator: BinaryOperator,
    left: &UnionType,
    right: &UnionType,
) -> UnionType {
    let native = |name: &str| UnionType::empty().with_type(pool.from_internal_type_name(name));

    if operator.is_boolean() {
        return native("bool");
    }

    if operator == BinaryOperator::Concat {
        return native("string");
    }

    if operator == BinaryOperator::Add && is_all_arrays(pool, left) && is_all_arrays(pool, right) {
        return native("array");
    }

    if operator == BinaryOperator::Modulo {
        return native("int");
    }

    if contains_name(pool, left, "float") || contains_name(pool, right, "float") {
        return native("float");
    }

    if operator != BinaryOperator::Divide
        && is_exactly(pool, left, "int")
        && is_exactly(pool, right, "int")
    {
        return native("int");
    }

    // Unknown or mixed operands, and int division, can go either way.
    native("int").with_type(pool.from_internal_type_name("float"))
}
