//! FQSEN - Fully Qualified Structural Element Names
//!
//! Globally unique identifiers for classes, functions, methods, and
//! properties, used as symbol-table keys. Equality and hashing go by the
//! canonical string form: class, function, and method names are
//! case-insensitive in PHP and canonicalize to lowercase; property names
//! keep their case.
//!
//! The namespace-resolution rules (alias map first, then the current
//! namespace) are factored into the helpers below and shared with
//! `TypePool::from_string_in_context` so the two paths cannot diverge.

use std::fmt;

use crate::env::Context;

/// The `use` statement kinds a context's alias map distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UseKind {
    Class,
    Function,
    Constant,
}

/// Split a `\`-prefixed fully-qualified string into (namespace, name).
pub(crate) fn split_fully_qualified(full_name: &str) -> (String, String) {
    assert!(
        full_name.starts_with('\\'),
        "fully-qualified name must start with the namespace separator: {:?}",
        full_name
    );

    let position = full_name.rfind('\\').unwrap_or(0);
    let namespace = if position == 0 {
        "\\".to_string()
    } else {
        full_name[..position].to_string()
    };
    let name = full_name[position + 1..].to_string();
    assert!(!name.is_empty(), "name must not be empty: {:?}", full_name);

    (namespace, name)
}

/// Resolve a relative name through the context's alias map. The first
/// path segment is the alias key; any remaining segments are appended to
/// the aliased target. Returns None when no alias applies.
pub(crate) fn resolve_via_alias(
    name: &str,
    kind: UseKind,
    context: &Context,
) -> Option<(String, String)> {
    let (first, rest) = match name.find('\\') {
        Some(position) => (&name[..position], Some(&name[position + 1..])),
        None => (name, None),
    };

    let target = context.namespace_map_entry(kind, &first.to_lowercase())?;
    let full = match rest {
        Some(rest) => format!("{}\\{}", target, rest),
        None => target.to_string(),
    };
    Some(split_fully_qualified(&full))
}

/// Attach the context's current namespace to an unqualified name.
pub(crate) fn qualify_in_current_namespace(name: &str, context: &Context) -> (String, String) {
    let namespace = context.namespace();
    let full = if namespace == "\\" {
        format!("\\{}", name)
    } else {
        format!("{}\\{}", namespace, name)
    };
    split_fully_qualified(&full)
}

// ===== Classes =====

/// Fully-qualified class name: `\Namespace\name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullyQualifiedClassName {
    namespace: String,
    name: String,
}

impl FullyQualifiedClassName {
    pub fn from_namespace_and_name(namespace: &str, name: &str) -> Self {
        assert!(!name.is_empty(), "class name must not be empty");
        assert!(
            namespace.starts_with('\\'),
            "namespace must start with the namespace separator: {:?}",
            namespace
        );
        Self {
            namespace: namespace.to_string(),
            name: name.to_lowercase(),
        }
    }

    pub fn from_fully_qualified_string(full_name: &str) -> Self {
        let (namespace, name) = split_fully_qualified(full_name);
        Self::from_namespace_and_name(&namespace, &name)
    }

    /// Resolve a class name written in source: fully-qualified, aliased,
    /// or relative to the context's namespace.
    pub fn from_string_in_context(name: &str, context: &Context) -> Self {
        if name.starts_with('\\') {
            return Self::from_fully_qualified_string(name);
        }
        if let Some((namespace, name)) = resolve_via_alias(name, UseKind::Class, context) {
            return Self::from_namespace_and_name(&namespace, &name);
        }
        let (namespace, name) = qualify_in_current_namespace(name, context);
        Self::from_namespace_and_name(&namespace, &name)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FullyQualifiedClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace == "\\" {
            write!(f, "\\{}", self.name)
        } else {
            write!(f, "{}\\{}", self.namespace, self.name)
        }
    }
}

// ===== Functions =====

/// Fully-qualified function name, with an alternate id distinguishing
/// overloaded built-in signatures (`\strpos`, `\strpos'1`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullyQualifiedFunctionName {
    namespace: String,
    name: String,
    alternate_id: u32,
}

impl FullyQualifiedFunctionName {
    pub fn from_namespace_and_name(namespace: &str, name: &str) -> Self {
        assert!(!name.is_empty(), "function name must not be empty");
        assert!(
            namespace.starts_with('\\'),
            "namespace must start with the namespace separator: {:?}",
            namespace
        );
        Self {
            namespace: namespace.to_string(),
            name: name.to_lowercase(),
            alternate_id: 0,
        }
    }

    pub fn from_fully_qualified_string(full_name: &str) -> Self {
        let (body, alternate_id) = match full_name.rsplit_once('\'') {
            Some((body, suffix)) => {
                let id = suffix
                    .parse::<u32>()
                    .unwrap_or_else(|_| panic!("bad alternate id suffix: {:?}", full_name));
                (body, id)
            }
            None => (full_name, 0),
        };
        let (namespace, name) = split_fully_qualified(body);
        Self::from_namespace_and_name(&namespace, &name).with_alternate_id(alternate_id)
    }

    pub fn from_string_in_context(name: &str, context: &Context) -> Self {
        if name.starts_with('\\') {
            return Self::from_fully_qualified_string(name);
        }
        if let Some((namespace, name)) = resolve_via_alias(name, UseKind::Function, context) {
            return Self::from_namespace_and_name(&namespace, &name);
        }
        let (namespace, name) = qualify_in_current_namespace(name, context);
        Self::from_namespace_and_name(&namespace, &name)
    }

    pub fn with_alternate_id(mut self, alternate_id: u32) -> Self {
        self.alternate_id = alternate_id;
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alternate_id(&self) -> u32 {
        self.alternate_id
    }
}

impl fmt::Display for FullyQualifiedFunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace == "\\" {
            write!(f, "\\{}", self.name)?;
        } else {
            write!(f, "{}\\{}", self.namespace, self.name)?;
        }
        if self.alternate_id > 0 {
            write!(f, "'{}", self.alternate_id)?;
        }
        Ok(())
    }
}

// ===== Methods =====

/// Fully-qualified method name: `\Namespace\class::method`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullyQualifiedMethodName {
    class: FullyQualifiedClassName,
    name: String,
}

impl FullyQualifiedMethodName {
    pub fn from_class_and_name(class: FullyQualifiedClassName, name: &str) -> Self {
        assert!(!name.is_empty(), "method name must not be empty");
        Self {
            class,
            name: name.to_lowercase(),
        }
    }

    pub fn from_fully_qualified_string(full_name: &str) -> Self {
        let (class, method) = full_name
            .split_once("::")
            .unwrap_or_else(|| panic!("method name must contain '::': {:?}", full_name));
        Self::from_class_and_name(
            FullyQualifiedClassName::from_fully_qualified_string(class),
            method,
        )
    }

    pub fn class(&self) -> &FullyQualifiedClassName {
        &self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FullyQualifiedMethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.class, self.name)
    }
}

// ===== Properties =====

/// Fully-qualified property name: `\Namespace\class::$property`.
/// Property names are case-sensitive in PHP and keep their case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FullyQualifiedPropertyName {
    class: FullyQualifiedClassName,
    name: String,
}

impl FullyQualifiedPropertyName {
    pub fn from_class_and_name(class: FullyQualifiedClassName, name: &str) -> Self {
        assert!(!name.is_empty(), "property name must not be empty");
        Self {
            class,
            name: name.to_string(),
        }
    }

    pub fn from_fully_qualified_string(full_name: &str) -> Self {
        let (class, property) = full_name
            .split_once("::")
            .unwrap_or_else(|| panic!("property name must contain '::': {:?}", full_name));
        let property = property.strip_prefix('$').unwrap_or(property);
        Self::from_class_and_name(
            FullyQualifiedClassName::from_fully_qualified_string(class),
            property,
        )
    }

    pub fn class(&self) -> &FullyQualifiedClassName {
        &self.class
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for FullyQualifiedPropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::${}", self.class, self.name)
    }
}

// ===== Sums =====

/// A function-like scope owner: a free function or a method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FunctionLikeFqsen {
    Function(FullyQualifiedFunctionName),
    Method(FullyQualifiedMethodName),
}

impl FunctionLikeFqsen {
    pub fn from_fully_qualified_string(full_name: &str) -> Self {
        if full_name.contains("::") {
            FunctionLikeFqsen::Method(FullyQualifiedMethodName::from_fully_qualified_string(
                full_name,
            ))
        } else {
            FunctionLikeFqsen::Function(FullyQualifiedFunctionName::from_fully_qualified_string(
                full_name,
            ))
        }
    }
}

impl fmt::Display for FunctionLikeFqsen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionLikeFqsen::Function(fqsen) => fqsen.fmt(f),
            FunctionLikeFqsen::Method(fqsen) => fqsen.fmt(f),
        }
    }
}

/// Any fully-qualified structural element name, for alias-map targets
/// and string-keyed storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fqsen {
    Class(FullyQualifiedClassName),
    Function(FullyQualifiedFunctionName),
    Method(FullyQualifiedMethodName),
    Property(FullyQualifiedPropertyName),
}

impl Fqsen {
    pub fn as_class(&self) -> Option<&FullyQualifiedClassName> {
        match self {
            Fqsen::Class(fqsen) => Some(fqsen),
            _ => None,
        }
    }
}

impl fmt::Display for Fqsen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fqsen::Class(fqsen) => fqsen.fmt(f),
            Fqsen::Function(fqsen) => fqsen.fmt(f),
            Fqsen::Method(fqsen) => fqsen.fmt(f),
            Fqsen::Property(fqsen) => fqsen.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{new_global_variable_map, Context, Scope};

    fn context() -> Context {
        Context::new(Scope::new(new_global_variable_map()))
    }

    #[test]
    fn test_class_names_are_canonicalized() {
        let a = FullyQualifiedClassName::from_fully_qualified_string("\\App\\User");
        let b = FullyQualifiedClassName::from_fully_qualified_string("\\App\\USER");

        assert_eq!(a, b);
        assert_eq!(a.to_string(), "\\App\\user");
        assert_eq!(a.namespace(), "\\App");
        assert_eq!(a.name(), "user");
    }

    #[test]
    fn test_global_class_display() {
        let fqsen = FullyQualifiedClassName::from_fully_qualified_string("\\Exception");
        assert_eq!(fqsen.to_string(), "\\exception");
    }

    #[test]
    #[should_panic(expected = "name must not be empty")]
    fn test_empty_name_is_rejected() {
        FullyQualifiedClassName::from_fully_qualified_string("\\App\\");
    }

    #[test]
    fn test_function_alternate_id_round_trip() {
        let fqsen = FullyQualifiedFunctionName::from_fully_qualified_string("\\strpos'1");

        assert_eq!(fqsen.name(), "strpos");
        assert_eq!(fqsen.alternate_id(), 1);
        assert_eq!(fqsen.to_string(), "\\strpos'1");

        let plain = FullyQualifiedFunctionName::from_fully_qualified_string("\\strpos");
        assert_eq!(plain.alternate_id(), 0);
        assert_eq!(plain.to_string(), "\\strpos");
        assert_ne!(plain, fqsen);
    }

    #[test]
    fn test_method_name_round_trip() {
        let fqsen = FullyQualifiedMethodName::from_fully_qualified_string("\\App\\User::getName");

        assert_eq!(fqsen.class().name(), "user");
        assert_eq!(fqsen.name(), "getname");
        assert_eq!(fqsen.to_string(), "\\App\\user::getname");
    }

    #[test]
    fn test_property_names_keep_case() {
        let fqsen =
            FullyQualifiedPropertyName::from_fully_qualified_string("\\App\\User::$firstName");

        assert_eq!(fqsen.name(), "firstName");
        assert_eq!(fqsen.to_string(), "\\App\\user::$firstName");
    }

    #[test]
    fn test_resolution_prefers_alias_over_namespace() {
        let context = context().with_namespace("\\Baz").with_namespace_map_entry(
            UseKind::Class,
            "foo",
            Fqsen::Class(FullyQualifiedClassName::from_fully_qualified_string(
                "\\Bar\\Foo",
            )),
        );

        let aliased = FullyQualifiedClassName::from_string_in_context("Foo", &context);
        assert_eq!(aliased.namespace(), "\\Bar");
        assert_eq!(aliased.name(), "foo");

        let relative = FullyQualifiedClassName::from_string_in_context("Widget", &context);
        assert_eq!(relative.namespace(), "\\Baz");
        assert_eq!(relative.name(), "widget");
    }

    #[test]
    fn test_alias_applies_to_leading_segment_only() {
        let context = context().with_namespace("\\Baz").with_namespace_map_entry(
            UseKind::Class,
            "foo",
            Fqsen::Class(FullyQualifiedClassName::from_fully_qualified_string(
                "\\Bar\\Foo",
            )),
        );

        let nested = FullyQualifiedClassName::from_string_in_context("Foo\\Inner", &context);
        assert_eq!(nested.namespace(), "\\Bar\\foo");
        assert_eq!(nested.name(), "inner");
    }

    #[test]
    fn test_function_kind_does_not_see_class_aliases() {
        let context = context().with_namespace("\\Baz").with_namespace_map_entry(
            UseKind::Class,
            "helper",
            Fqsen::Class(FullyQualifiedClassName::from_fully_qualified_string(
                "\\Bar\\Helper",
            )),
        );

        let function = FullyQualifiedFunctionName::from_string_in_context("helper", &context);
        assert_eq!(function.namespace(), "\\Baz");
    }
}
