//! Variable Handlers - variable reads and writes against the scope

use crate::ast::Node;
use crate::diagnostics::Issue;
use crate::env::{Context, Variable};
use crate::types::UnionType;

/// Type of a variable read. An unbound name is the recoverable
/// "could not resolve" path, reported to the caller as an issue.
pub fn variable_union_type(context: &Context, name: &str, node: &Node) -> Result<UnionType, Issue> {
    match context.scope().get_variable_with_name(name) {
        Some(variable) => Ok(variable.union_type),
        None => Err(Issue::UndefinedVariable {
            name: name.to_string(),
            line: node.line,
        }),
    }
}

/// Bind an assigned variable into the current scope. Uses the in-place
/// `add_variable` escape hatch: inference walks one expression at a time
/// and the context is not shared while it does.
pub fn assign_variable(context: &mut Context, name: &str, union_type: UnionType) {
    context
        .scope_mut()
        .add_variable(Variable::new(name, union_type));
}
