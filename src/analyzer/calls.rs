//! Call Handlers - function calls, method calls, property access, new
//!
//! Resolution order mirrors the runtime: an unqualified function name
//! tries the current namespace, then the global namespace, then the
//! built-in signature tables. Method and property lookup expand the
//! receiver type first so inherited members resolve through ancestors.

use crate::codebase::CodeBase;
use crate::diagnostics::Issue;
use crate::env::Context;
use crate::fqsen::{FullyQualifiedClassName, FullyQualifiedFunctionName};
use crate::signatures::SignatureMaps;
use crate::types::{TypeId, TypePool, UnionType};

/// Return type of a free function call.
pub fn call_union_type(
    pool: &mut TypePool,
    codebase: &dyn CodeBase,
    signatures: &SignatureMaps,
    context: &Context,
    function: &str,
    line: u32,
) -> Result<UnionType, Issue> {
    let fqsen = FullyQualifiedFunctionName::from_string_in_context(function, context);
    if let Some(symbol) = codebase.get_function_by_fqsen(&fqsen) {
        return Ok(symbol.return_type.clone());
    }

    // Unqualified names fall back to the global namespace.
    if !function.contains('\\') {
        let global = FullyQualifiedFunctionName::from_namespace_and_name("\\", function);
        if let Some(symbol) = codebase.get_function_by_fqsen(&global) {
            return Ok(symbol.return_type.clone());
        }

        if signatures.has_function(function) {
            return Ok(signatures.function_return_union_type(pool, function));
        }
    }

    Err(Issue::UndefinedFunction {
        name: function.to_string(),
        line,
    })
}

/// Return type of `$object->method(...)`, unioned across every receiver
/// branch that resolves. An empty receiver type resolves to empty: the
/// receiver is unknown, not wrong.
pub fn method_call_union_type(
    pool: &mut TypePool,
    codebase: &dyn CodeBase,
    object_type: &UnionType,
    method: &str,
    line: u32,
) -> Result<UnionType, Issue> {
    if object_type.is_empty() {
        return Ok(UnionType::empty());
    }

    let expanded = object_type.as_expanded_types(pool, codebase, 0);
    let method_key = method.to_lowercase();

    let mut result = UnionType::empty();
    let mut resolved = false;
    let mut class_without_method: Option<String> = None;
    let mut unknown_class: Option<String> = None;

    for &id in expanded.type_ids() {
        let Some(fqsen) = class_fqsen_for(pool, id) else {
            continue;
        };
        match codebase.get_class_by_fqsen(&fqsen) {
            Some(class) => match class.methods.get(&method_key) {
                Some(symbol) => {
                    result.add_union_type(&symbol.return_type);
                    resolved = true;
                }
                None => class_without_method = Some(fqsen.to_string()),
            },
            None => unknown_class = Some(fqsen.to_string()),
        }
    }

    if resolved {
        Ok(result)
    } else if let Some(class) = class_without_method {
        Err(Issue::UndefinedMethod {
            class,
            method: method.to_string(),
            line,
        })
    } else if let Some(fqsen) = unknown_class {
        Err(Issue::UndefinedClass { fqsen, line })
    } else {
        // Only native receivers; nothing to resolve against.
        Ok(UnionType::empty())
    }
}

/// Return type of `ClassName::method(...)`.
pub fn static_call_union_type(
    codebase: &dyn CodeBase,
    context: &Context,
    class: &str,
    method: &str,
    line: u32,
) -> Result<UnionType, Issue> {
    let fqsen = resolve_class_name(context, class, line)?;

    let Some(symbol) = codebase.get_class_by_fqsen(&fqsen) else {
        return Err(Issue::UndefinedClass {
            fqsen: fqsen.to_string(),
            line,
        });
    };

    match symbol.methods.get(&method.to_lowercase()) {
        Some(symbol) => Ok(symbol.return_type.clone()),
        None => Err(Issue::UndefinedMethod {
            class: fqsen.to_string(),
            method: method.to_string(),
            line,
        }),
    }
}

/// Type of `$object->property`, unioned across receiver branches, with
/// the built-in class signature table as a fallback for classes the
/// code base does not declare.
pub fn property_union_type(
    pool: &mut TypePool,
    codebase: &dyn CodeBase,
    signatures: &SignatureMaps,
    object_type: &UnionType,
    property: &str,
    line: u32,
) -> Result<UnionType, Issue> {
    if object_type.is_empty() {
        return Ok(UnionType::empty());
    }

    let expanded = object_type.as_expanded_types(pool, codebase, 0);

    let mut result = UnionType::empty();
    let mut resolved = false;
    let mut class_without_property: Option<String> = None;
    let mut unknown_class: Option<String> = None;

    for &id in expanded.type_ids() {
        let Some(fqsen) = class_fqsen_for(pool, id) else {
            continue;
        };
        match codebase.get_class_by_fqsen(&fqsen) {
            Some(class) => match class.properties.get(property) {
                Some(symbol) => {
                    result.add_union_type(&symbol.union_type);
                    resolved = true;
                }
                None => class_without_property = Some(fqsen.to_string()),
            },
            None => {
                // Internal classes live in the signature table, not the
                // code base.
                if let Some(type_string) = signatures.property_type(fqsen.name(), property) {
                    let parsed = UnionType::from_fully_qualified_string(pool, type_string);
                    result.add_union_type(&parsed);
                    resolved = true;
                } else {
                    unknown_class = Some(fqsen.to_string());
                }
            }
        }
    }

    if resolved {
        Ok(result)
    } else if let Some(class) = class_without_property {
        Err(Issue::UndefinedProperty {
            class,
            property: property.to_string(),
            line,
        })
    } else if let Some(fqsen) = unknown_class {
        Err(Issue::UndefinedClass { fqsen, line })
    } else {
        Ok(UnionType::empty())
    }
}

/// Type of `new ClassName(...)`.
pub fn new_union_type(
    pool: &mut TypePool,
    context: &Context,
    class: &str,
    line: u32,
) -> Result<UnionType, Issue> {
    let fqsen = resolve_class_name(context, class, line)?;
    let id = pool.from_namespace_and_name(fqsen.namespace(), fqsen.name());
    Ok(UnionType::empty().with_type(id))
}

/// Resolve a class name written in source, honoring `self`/`static`
/// inside a class scope.
fn resolve_class_name(
    context: &Context,
    class: &str,
    line: u32,
) -> Result<FullyQualifiedClassName, Issue> {
    if matches!(class.to_lowercase().as_str(), "self" | "static") {
        return match context.class_fqsen() {
            Some(fqsen) => Ok(fqsen.clone()),
            None => Err(Issue::UndefinedClass {
                fqsen: class.to_string(),
                line,
            }),
        };
    }
    Ok(FullyQualifiedClassName::from_string_in_context(
        class, context,
    ))
}

/// The class FQSEN a type refers to, when it refers to one.
fn class_fqsen_for(pool: &TypePool, id: TypeId) -> Option<FullyQualifiedClassName> {
    if pool.is_native_type(id) || pool.is_generic(id) || pool.is_self_type(id) {
        return None;
    }
    Some(FullyQualifiedClassName::from_namespace_and_name(
        pool.namespace(id),
        pool.name(id),
    ))
}
