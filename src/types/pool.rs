//! Type Pool - interned concrete PHP types
//!
//! Every concrete type is interned per (namespace, name) so that two
//! resolutions of the same name yield the same `TypeId`. Identity
//! comparison of ids is therefore value equality, and union-type sets
//! can dedup by id alone. The pool is owned by an analysis session;
//! parallel workers each construct their own pool.

use std::collections::HashMap;

use crate::codebase::CodeBase;
use crate::env::Context;
use crate::fqsen::{
    qualify_in_current_namespace, resolve_via_alias, split_fully_qualified,
    FullyQualifiedClassName, UseKind,
};
use crate::types::union::{set_insert, TypeSet};

/// Recursion ceiling for `expand`. Exceeding it is a caller bug, not a
/// normal termination path.
pub const EXPANSION_DEPTH_LIMIT: u32 = 10;

/// The fixed native type vocabulary.
const NATIVE_TYPE_NAMES: &[&str] = &[
    "array", "bool", "callable", "float", "int", "mixed", "null", "object", "resource", "string",
    "void",
];

/// Names that refer to the class in the current scope.
const SELF_TYPE_NAMES: &[&str] = &["self", "static", "$this"];

/// Stable handle to an interned type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

/// Interned payload of one concrete type.
#[derive(Debug, Clone)]
struct TypeData {
    /// Fully-qualified namespace, always starting with `\` (`\` alone is
    /// the global namespace).
    namespace: String,
    /// Type name. Lowercased in the global namespace; keeps the trailing
    /// `[]` suffix for generic array types.
    name: String,
    /// Element type for generic array types (`T[]`).
    element: Option<TypeId>,
}

/// Session-owned interning table for concrete types.
pub struct TypePool {
    data: Vec<TypeData>,
    interned: HashMap<(String, String), TypeId>,
    expansion_memo: HashMap<TypeId, TypeSet>,

    /// When set, a union that is exactly `null` casts to anything (and
    /// anything casts to it).
    pub null_casts_as_any_type: bool,
}

/// Legacy spellings accepted by `from_internal_type_name`. Input is
/// lowercased before this table applies.
fn internal_alias(name: &str) -> Option<&'static str> {
    match name {
        "integer" => Some("int"),
        "double" => Some("float"),
        "boolean" => Some("bool"),
        "false" => Some("bool"),
        "true" => Some("bool"),
        "callback" => Some("callable"),
        "closure" => Some("callable"),
        _ => None,
    }
}

/// Names are lowercased only in the global namespace; namespaced class
/// names keep their case.
fn canonical_name(namespace: &str, name: &str) -> String {
    if namespace == "\\" {
        name.to_lowercase()
    } else {
        name.to_string()
    }
}

impl TypePool {
    pub fn new() -> Self {
        let mut pool = Self {
            data: Vec::new(),
            interned: HashMap::new(),
            expansion_memo: HashMap::new(),
            null_casts_as_any_type: false,
        };

        // Pre-intern the native vocabulary so native lookups never miss.
        for name in NATIVE_TYPE_NAMES {
            pool.intern("\\", name, None);
        }

        pool
    }

    /// Number of distinct interned types.
    pub fn type_count(&self) -> usize {
        self.data.len()
    }

    fn data(&self, id: TypeId) -> &TypeData {
        &self.data[id.0 as usize]
    }

    fn intern(&mut self, namespace: &str, name: &str, element: Option<TypeId>) -> TypeId {
        assert!(!name.is_empty(), "type name must not be empty");
        assert!(
            !name.contains('|'),
            "type name must not contain the union separator: {:?}",
            name
        );
        assert!(
            namespace.starts_with('\\'),
            "namespace must start with the namespace separator: {:?}",
            namespace
        );

        let key = (namespace.to_string(), name.to_string());
        if let Some(&id) = self.interned.get(&key) {
            return id;
        }

        let id = TypeId(self.data.len() as u32);
        self.data.push(TypeData {
            namespace: key.0.clone(),
            name: key.1.clone(),
            element,
        });
        self.interned.insert(key, id);
        id
    }

    fn native_id(&self, name: &str) -> TypeId {
        self.interned
            .get(&("\\".to_string(), name.to_string()))
            .copied()
            .expect("native types are pre-interned")
    }

    // ===== Construction =====

    /// Intern the type `(namespace, name)`. A trailing `[]` suffix
    /// constructs a generic array wrapper around the element type, one
    /// suffix level per recursion step.
    pub fn from_namespace_and_name(&mut self, namespace: &str, name: &str) -> TypeId {
        if let Some(element_name) = name.strip_suffix("[]") {
            let element = self.from_namespace_and_name(namespace, element_name);
            return self.make_generic(element);
        }

        let canonical = canonical_name(namespace, name);
        self.intern(namespace, &canonical, None)
    }

    /// Whether a bare name, with the alias table applied, is in the
    /// native vocabulary.
    pub fn is_internal_type_name(name: &str) -> bool {
        let lower = name.to_lowercase();
        let resolved = internal_alias(&lower).unwrap_or(&lower);
        NATIVE_TYPE_NAMES.contains(&resolved)
    }

    /// Look up one of the fixed native types, accepting the legacy alias
    /// spellings (`integer`, `double`, `NULL`, ...).
    ///
    /// Panics on names outside the native vocabulary; callers either
    /// validate first or treat the name as a class reference.
    pub fn from_internal_type_name(&self, name: &str) -> TypeId {
        let lower = name.to_lowercase();
        let resolved = internal_alias(&lower).unwrap_or(&lower);
        assert!(
            NATIVE_TYPE_NAMES.contains(&resolved),
            "not an internal type name: {:?}",
            name
        );
        self.native_id(resolved)
    }

    /// Intern a type from its fully-qualified string form: either a
    /// `\`-prefixed class name or a bare native name.
    pub fn from_fully_qualified_string(&mut self, type_string: &str) -> TypeId {
        assert!(!type_string.is_empty(), "type name must not be empty");

        if let Some(element_string) = type_string.strip_suffix("[]") {
            let element = self.from_fully_qualified_string(element_string);
            return self.make_generic(element);
        }

        if !type_string.starts_with('\\') {
            return self.from_internal_type_name(type_string);
        }

        let (namespace, name) = split_fully_qualified(type_string);
        self.from_namespace_and_name(&namespace, &name)
    }

    /// The general entry point: resolve a type name written in source
    /// against a context. Fully-qualified names resolve directly; bare
    /// names go through the context's `use` alias map, then the native
    /// vocabulary, then attach to the context's current namespace.
    pub fn from_string_in_context(&mut self, type_string: &str, context: &Context) -> TypeId {
        assert!(!type_string.is_empty(), "type name must not be empty");

        if let Some(element_string) = type_string.strip_suffix("[]") {
            let element = self.from_string_in_context(element_string, context);
            return self.make_generic(element);
        }

        if type_string.starts_with('\\') {
            return self.from_fully_qualified_string(type_string);
        }

        if let Some((namespace, name)) = resolve_via_alias(type_string, UseKind::Class, context) {
            return self.from_namespace_and_name(&namespace, &name);
        }

        let lower = type_string.to_lowercase();
        let native = internal_alias(&lower).unwrap_or(&lower);
        if NATIVE_TYPE_NAMES.contains(&native) {
            return self.native_id(native);
        }

        let (namespace, name) = qualify_in_current_namespace(type_string, context);
        self.from_namespace_and_name(&namespace, &name)
    }

    /// Wrap `element` in one level of generic array, with no collapsing.
    fn make_generic(&mut self, element: TypeId) -> TypeId {
        let namespace = self.data(element).namespace.clone();
        let name = format!("{}[]", self.data(element).name);
        self.intern(&namespace, &name, Some(element))
    }

    // ===== Accessors =====

    pub fn namespace(&self, id: TypeId) -> &str {
        &self.data(id).namespace
    }

    pub fn name(&self, id: TypeId) -> &str {
        &self.data(id).name
    }

    pub fn element_type(&self, id: TypeId) -> Option<TypeId> {
        self.data(id).element
    }

    /// String form of one type: bare for native and self types, `\`-
    /// qualified for class types, with `[]` suffixes for generics.
    pub fn type_string(&self, id: TypeId) -> String {
        let data = self.data(id);
        if let Some(element) = data.element {
            return format!("{}[]", self.type_string(element));
        }

        if self.is_native_type(id) || self.is_self_type(id) {
            data.name.clone()
        } else if data.namespace == "\\" {
            format!("\\{}", data.name)
        } else {
            format!("{}\\{}", data.namespace, data.name)
        }
    }

    // ===== Predicates =====

    /// True when the name, with any `[]` suffixes stripped, is in the
    /// native vocabulary.
    pub fn is_native_type(&self, id: TypeId) -> bool {
        let data = self.data(id);
        let mut base = data.name.as_str();
        while let Some(stripped) = base.strip_suffix("[]") {
            base = stripped;
        }
        data.namespace == "\\" && NATIVE_TYPE_NAMES.contains(&base)
    }

    /// True for `self`, `static`, and `$this`, qualified or not.
    pub fn is_self_type(&self, id: TypeId) -> bool {
        let lower = self.data(id).name.to_lowercase();
        SELF_TYPE_NAMES.contains(&lower.as_str())
    }

    pub fn is_scalar(&self, id: TypeId) -> bool {
        matches!(
            self.data(id).name.as_str(),
            "int" | "float" | "bool" | "true" | "string" | "null"
        )
    }

    /// Scalars that interpolate into a string without notice.
    pub fn is_printable_scalar(&self, id: TypeId) -> bool {
        matches!(self.data(id).name.as_str(), "int" | "float" | "string")
    }

    /// True for generic array types (`T[]`). The flat `array` type is not
    /// generic.
    pub fn is_generic(&self, id: TypeId) -> bool {
        self.data(id).element.is_some()
    }

    /// The flat `array` type and generic array types.
    fn is_array_like(&self, id: TypeId) -> bool {
        self.is_generic(id) || self.data(id).name == "array"
    }

    /// Strip exactly one trailing `[]`; non-generic types return
    /// themselves.
    pub fn as_non_generic_type(&self, id: TypeId) -> TypeId {
        self.data(id).element.unwrap_or(id)
    }

    /// Wrap in one level of generic array. `array`, `mixed`, and already-
    /// generic types collapse to the flat `array` type instead of
    /// accumulating suffixes.
    pub fn as_generic_type(&mut self, id: TypeId) -> TypeId {
        let name = self.data(id).name.as_str();
        if name == "array" || name == "mixed" || self.is_generic(id) {
            return self.native_id("array");
        }
        self.make_generic(id)
    }

    // ===== Cast relation =====

    /// Pragmatic asymmetric cast-compatibility table. The rules apply in
    /// priority order; this is not a subtype lattice. Callers needing an
    /// inheritance-aware answer expand both sides first and re-run this
    /// relation over the expanded sets.
    pub fn can_cast_to_type(&self, from: TypeId, to: TypeId) -> bool {
        // 1. Identity. Interning makes name equality reference equality.
        if from == to {
            return true;
        }

        let from_name = self.data(from).name.as_str();
        let to_name = self.data(to).name.as_str();

        // 2. int widens to float.
        if from_name == "int" && to_name == "float" {
            return true;
        }

        // 3. array, string, and generic arrays are acceptable callables.
        if to_name == "callable"
            && (from_name == "array" || from_name == "string" || self.is_generic(from))
        {
            return true;
        }

        // 4. object casts to any non-scalar, non-array type, and the
        //    reverse.
        if from_name == "object" && !self.is_scalar(to) && !self.is_array_like(to) {
            return true;
        }
        if to_name == "object" && !self.is_scalar(from) && !self.is_array_like(from) {
            return true;
        }

        // 5. Generic arrays and the flat array type are interchangeable.
        if self.is_generic(from) && to_name == "array" {
            return true;
        }
        if from_name == "array" && self.is_generic(to) {
            return true;
        }

        // 6. Loose fallback for partially-known hierarchies: treat the
        //    pair as castable when one side's fully-qualified form ends
        //    with the other side's bare name. Known to produce false
        //    positives for unrelated same-named classes.
        let from_string = self.type_string(from).trim_matches('\\').to_lowercase();
        let to_string = self.type_string(to).trim_matches('\\').to_lowercase();
        if from_string.ends_with(&to_name.to_lowercase())
            || to_string.ends_with(&from_name.to_lowercase())
        {
            return true;
        }

        false
    }

    // ===== Expansion =====

    /// The transitive closure of this type with its class's declared
    /// union type, so a subclass is recognized against an ancestor-typed
    /// target. Native and generic types expand to themselves. Memoized
    /// per type; one pool serves exactly one `CodeBase`.
    pub fn expand(&mut self, id: TypeId, codebase: &dyn CodeBase, depth: u32) -> TypeSet {
        assert!(
            depth <= EXPANSION_DEPTH_LIMIT,
            "type expansion exceeded depth {} at {}",
            EXPANSION_DEPTH_LIMIT,
            self.type_string(id)
        );

        if let Some(expanded) = self.expansion_memo.get(&id) {
            return expanded.clone();
        }

        let mut expanded = TypeSet::new();
        set_insert(&mut expanded, id);

        if !self.is_native_type(id) && !self.is_generic(id) && !self.is_self_type(id) {
            let fqsen = FullyQualifiedClassName::from_namespace_and_name(
                self.namespace(id),
                self.name(id),
            );

            let declared: Vec<TypeId> = match codebase.get_class_by_fqsen(&fqsen) {
                Some(class) => class.union_type.type_ids().to_vec(),
                None => Vec::new(),
            };

            let own_string = self.type_string(id);
            for constituent in declared {
                // A self-referential declaration must not recurse.
                if self.type_string(constituent) == own_string {
                    continue;
                }
                for member in self.expand(constituent, codebase, depth + 1) {
                    set_insert(&mut expanded, member);
                }
            }
        }

        self.expansion_memo.insert(id, expanded.clone());
        expanded
    }
}

impl Default for TypePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebase::{ClassSymbol, SymbolTable};
    use crate::env::{new_global_variable_map, Context, Scope};
    use crate::fqsen::Fqsen;
    use crate::types::UnionType;

    fn empty_context() -> Context {
        Context::new(Scope::new(new_global_variable_map()))
    }

    #[test]
    fn test_memoization_identity() {
        let mut pool = TypePool::new();

        let a = pool.from_namespace_and_name("\\Foo", "Bar");
        let count = pool.type_count();
        let b = pool.from_namespace_and_name("\\Foo", "Bar");

        assert_eq!(a, b);
        assert_eq!(pool.type_count(), count);
    }

    #[test]
    fn test_global_names_are_lowercased() {
        let mut pool = TypePool::new();

        let a = pool.from_namespace_and_name("\\", "MyClass");
        let b = pool.from_namespace_and_name("\\", "myclass");

        assert_eq!(a, b);
        assert_eq!(pool.name(a), "myclass");
    }

    #[test]
    fn test_namespaced_names_keep_case() {
        let mut pool = TypePool::new();

        let id = pool.from_namespace_and_name("\\Api", "User");
        assert_eq!(pool.name(id), "User");
        assert_eq!(pool.type_string(id), "\\Api\\User");
    }

    #[test]
    fn test_internal_type_aliases() {
        let pool = TypePool::new();

        assert_eq!(
            pool.from_internal_type_name("integer"),
            pool.from_internal_type_name("int")
        );
        assert_eq!(
            pool.from_internal_type_name("double"),
            pool.from_internal_type_name("float")
        );
        assert_eq!(
            pool.from_internal_type_name("NULL"),
            pool.from_internal_type_name("null")
        );
        assert_eq!(
            pool.from_internal_type_name("Closure"),
            pool.from_internal_type_name("callable")
        );
    }

    #[test]
    #[should_panic(expected = "not an internal type name")]
    fn test_unknown_internal_type_name_panics() {
        let pool = TypePool::new();
        pool.from_internal_type_name("definitely_not_a_type");
    }

    #[test]
    fn test_generic_round_trip() {
        let mut pool = TypePool::new();

        let id = pool.from_namespace_and_name("\\", "int[]");
        assert!(pool.is_generic(id));

        let element = pool.as_non_generic_type(id);
        assert_eq!(pool.name(element), "int");
        assert!(!pool.is_generic(element));
    }

    #[test]
    fn test_as_generic_type_collapses_array_and_mixed() {
        let mut pool = TypePool::new();

        let array = pool.from_internal_type_name("array");
        let mixed = pool.from_internal_type_name("mixed");
        let int_array = pool.from_fully_qualified_string("int[]");

        assert_eq!(pool.as_generic_type(array), array);
        assert_eq!(pool.as_generic_type(mixed), array);
        assert_eq!(pool.as_generic_type(int_array), array);

        let int = pool.from_internal_type_name("int");
        assert_eq!(pool.as_generic_type(int), int_array);
    }

    #[test]
    fn test_from_fully_qualified_string() {
        let mut pool = TypePool::new();

        let id = pool.from_fully_qualified_string("\\Bar\\Foo");
        assert_eq!(pool.namespace(id), "\\Bar");
        assert_eq!(pool.name(id), "Foo");

        let native = pool.from_fully_qualified_string("string");
        assert_eq!(native, pool.from_internal_type_name("string"));
    }

    #[test]
    fn test_from_string_in_context_alias_resolution() {
        let mut pool = TypePool::new();

        let context = empty_context()
            .with_namespace("\\Baz")
            .with_namespace_map_entry(
                UseKind::Class,
                "foo",
                Fqsen::Class(FullyQualifiedClassName::from_fully_qualified_string(
                    "\\Bar\\Foo",
                )),
            );

        let id = pool.from_string_in_context("Foo", &context);
        assert_eq!(pool.namespace(id), "\\Bar");
        assert_eq!(pool.name(id), "foo");
    }

    #[test]
    fn test_from_string_in_context_current_namespace_fallback() {
        let mut pool = TypePool::new();

        let context = empty_context().with_namespace("\\Baz");
        let id = pool.from_string_in_context("Widget", &context);

        assert_eq!(pool.namespace(id), "\\Baz");
        assert_eq!(pool.name(id), "Widget");
    }

    #[test]
    fn test_from_string_in_context_native_shortcut() {
        let mut pool = TypePool::new();

        let context = empty_context().with_namespace("\\Baz");
        let id = pool.from_string_in_context("int", &context);

        assert_eq!(id, pool.from_internal_type_name("int"));
    }

    #[test]
    fn test_self_type_predicate() {
        let mut pool = TypePool::new();

        let this = pool.from_namespace_and_name("\\", "$this");
        let selfish = pool.from_namespace_and_name("\\Baz", "self");
        let user = pool.from_namespace_and_name("\\Baz", "User");

        assert!(pool.is_self_type(this));
        assert!(pool.is_self_type(selfish));
        assert!(!pool.is_self_type(user));
    }

    #[test]
    fn test_cast_int_to_float_not_reverse() {
        let pool = TypePool::new();

        let int = pool.from_internal_type_name("int");
        let float = pool.from_internal_type_name("float");

        assert!(pool.can_cast_to_type(int, float));
        assert!(!pool.can_cast_to_type(float, int));
    }

    #[test]
    fn test_cast_to_callable() {
        let mut pool = TypePool::new();

        let callable = pool.from_internal_type_name("callable");
        let array = pool.from_internal_type_name("array");
        let string = pool.from_internal_type_name("string");
        let string_array = pool.from_fully_qualified_string("string[]");
        let int = pool.from_internal_type_name("int");

        assert!(pool.can_cast_to_type(array, callable));
        assert!(pool.can_cast_to_type(string, callable));
        assert!(pool.can_cast_to_type(string_array, callable));
        assert!(!pool.can_cast_to_type(int, callable));
    }

    #[test]
    fn test_cast_object_to_class() {
        let mut pool = TypePool::new();

        let object = pool.from_internal_type_name("object");
        let user = pool.from_fully_qualified_string("\\App\\User");
        let int = pool.from_internal_type_name("int");
        let array = pool.from_internal_type_name("array");

        assert!(pool.can_cast_to_type(object, user));
        assert!(pool.can_cast_to_type(user, object));
        assert!(!pool.can_cast_to_type(object, int));
        assert!(!pool.can_cast_to_type(object, array));
    }

    #[test]
    fn test_cast_generic_and_flat_array() {
        let mut pool = TypePool::new();

        let array = pool.from_internal_type_name("array");
        let int_array = pool.from_fully_qualified_string("int[]");

        assert!(pool.can_cast_to_type(int_array, array));
        assert!(pool.can_cast_to_type(array, int_array));
    }

    #[test]
    fn test_cast_namespace_suffix_heuristic() {
        let mut pool = TypePool::new();

        // A class name matching the tail of another's fully-qualified
        // form is accepted. This is the documented loose fallback: the
        // two Item classes below are unrelated, and the relation still
        // accepts the pair.
        let a_item = pool.from_fully_qualified_string("\\A\\Item");
        let b_item = pool.from_fully_qualified_string("\\B\\Item");
        assert!(pool.can_cast_to_type(a_item, b_item));

        let user = pool.from_fully_qualified_string("\\App\\User");
        let order = pool.from_fully_qualified_string("\\App\\Order");
        assert!(!pool.can_cast_to_type(user, order));
    }

    #[test]
    fn test_expand_native_type_is_itself() {
        let mut pool = TypePool::new();
        let codebase = SymbolTable::new();

        let int = pool.from_internal_type_name("int");
        let expanded = pool.expand(int, &codebase, 0);

        assert_eq!(expanded.as_slice(), &[int]);
    }

    #[test]
    fn test_expand_follows_declared_ancestors() {
        let mut pool = TypePool::new();
        let mut codebase = SymbolTable::new();

        let base = pool.from_fully_qualified_string("\\App\\Base");
        let child = pool.from_fully_qualified_string("\\App\\Child");

        let child_fqsen = FullyQualifiedClassName::from_fully_qualified_string("\\App\\Child");
        let mut class = ClassSymbol::new(child_fqsen.clone());
        class.union_type = UnionType::empty().with_type(base);
        codebase.add_class(class);

        let expanded = pool.expand(child, &codebase, 0);
        assert!(expanded.contains(&child));
        assert!(expanded.contains(&base));
        assert_eq!(expanded.len(), 2);
    }

    #[test]
    fn test_expand_self_referential_terminates() {
        let mut pool = TypePool::new();
        let mut codebase = SymbolTable::new();

        let a = pool.from_fully_qualified_string("\\App\\A");
        let a_fqsen = FullyQualifiedClassName::from_fully_qualified_string("\\App\\A");
        let mut class = ClassSymbol::new(a_fqsen);
        class.union_type = UnionType::empty().with_type(a);
        codebase.add_class(class);

        let expanded = pool.expand(a, &codebase, 0);
        assert_eq!(expanded.as_slice(), &[a]);
    }

    #[test]
    fn test_expand_is_memoized() {
        let mut pool = TypePool::new();
        let codebase = SymbolTable::new();

        let user = pool.from_fully_qualified_string("\\App\\User");
        let first = pool.expand(user, &codebase, 0);
        let second = pool.expand(user, &codebase, 0);

        assert_eq!(first, second);
    }
}
