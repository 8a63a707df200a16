//! Union Type - a set of possible concrete types
//!
//! A union type is the analyzer's answer to "what can this expression
//! be": zero or more concrete types, order-irrelevant, deduplicated by
//! interned id. The empty union is a distinct variant with hardcoded
//! policy answers ("cannot falsify an unknown"), not an empty collection
//! relying on vacuous truth. The possibly-undefined variant decorates a
//! set for optional array-shape fields and only changes serialization.

use smallvec::SmallVec;

use crate::codebase::CodeBase;
use crate::env::Context;
use crate::types::pool::{TypeId, TypePool};

/// Member storage for a union type. Kept sorted by id so that equality
/// is set equality and iteration is deterministic.
pub type TypeSet = SmallVec<[TypeId; 4]>;

/// Insert preserving sort order; duplicates are dropped.
pub(crate) fn set_insert(set: &mut TypeSet, id: TypeId) {
    if let Err(position) = set.binary_search(&id) {
        set.insert(position, id);
    }
}

/// A set of zero or more concrete types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnionType {
    /// No type could be inferred.
    Empty,
    /// The general case.
    Known(TypeSet),
    /// A known set for an optional array-shape field; serializes with a
    /// trailing `=` marker. Every query delegates to the set unchanged.
    PossiblyUndefined(TypeSet),
}

impl UnionType {
    pub fn empty() -> Self {
        UnionType::Empty
    }

    /// Build from a member set; an empty set is the empty union.
    pub fn of(mut set: TypeSet) -> Self {
        set.sort_unstable();
        set.dedup();
        if set.is_empty() {
            UnionType::Empty
        } else {
            UnionType::Known(set)
        }
    }

    /// Parse a `|`-separated union of fully-qualified type strings.
    /// Empty segments are dropped; an empty string is the empty union.
    /// A trailing `=` marks the union as possibly undefined.
    pub fn from_fully_qualified_string(pool: &mut TypePool, union_string: &str) -> Self {
        let (body, possibly_undefined) = match union_string.strip_suffix('=') {
            Some(body) => (body, true),
            None => (union_string, false),
        };

        let mut set = TypeSet::new();
        for segment in body.split('|') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            set_insert(&mut set, pool.from_fully_qualified_string(segment));
        }

        UnionType::of(set).with_is_possibly_undefined(possibly_undefined)
    }

    /// Parse a `|`-separated union, resolving each segment against the
    /// context (alias map, native vocabulary, current namespace).
    pub fn from_string_in_context(pool: &mut TypePool, union_string: &str, context: &Context) -> Self {
        let mut set = TypeSet::new();
        for segment in union_string.split('|') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            set_insert(&mut set, pool.from_string_in_context(segment, context));
        }
        UnionType::of(set)
    }

    pub fn type_ids(&self) -> &[TypeId] {
        match self {
            UnionType::Empty => &[],
            UnionType::Known(set) | UnionType::PossiblyUndefined(set) => set,
        }
    }

    /// Rebuild with a new member set, preserving the possibly-undefined
    /// annotation.
    fn with_type_set(&self, mut set: TypeSet) -> Self {
        match self {
            UnionType::PossiblyUndefined(_) => {
                set.sort_unstable();
                set.dedup();
                UnionType::PossiblyUndefined(set)
            }
            _ => UnionType::of(set),
        }
    }

    // ===== Construction =====

    pub fn add_type(&mut self, id: TypeId) {
        match self {
            UnionType::Empty => *self = UnionType::Known(SmallVec::from_slice(&[id])),
            UnionType::Known(set) | UnionType::PossiblyUndefined(set) => set_insert(set, id),
        }
    }

    pub fn with_type(mut self, id: TypeId) -> Self {
        self.add_type(id);
        self
    }

    pub fn add_union_type(&mut self, other: &UnionType) {
        for &id in other.type_ids() {
            self.add_type(id);
        }
    }

    pub fn with_union_type(mut self, other: &UnionType) -> Self {
        self.add_union_type(other);
        self
    }

    pub fn with_is_possibly_undefined(self, possibly_undefined: bool) -> Self {
        let annotated = matches!(self, UnionType::PossiblyUndefined(_));
        match (self, possibly_undefined, annotated) {
            (this, true, true) | (this, false, false) => this,
            (UnionType::Empty, true, _) => UnionType::PossiblyUndefined(TypeSet::new()),
            (UnionType::Known(set), true, _) => UnionType::PossiblyUndefined(set),
            (UnionType::PossiblyUndefined(set), false, _) => UnionType::of(set),
            (this, _, _) => this,
        }
    }

    pub fn is_possibly_undefined(&self) -> bool {
        matches!(self, UnionType::PossiblyUndefined(_))
    }

    // ===== Queries =====

    pub fn is_empty(&self) -> bool {
        self.type_ids().is_empty()
    }

    pub fn type_count(&self) -> usize {
        self.type_ids().len()
    }

    pub fn has_type(&self, id: TypeId) -> bool {
        self.type_ids().contains(&id)
    }

    /// Whether this union is exactly one type with the given name.
    fn is_exactly(&self, pool: &TypePool, name: &str) -> bool {
        matches!(self.type_ids(), [only] if pool.name(*only) == name)
    }

    fn contains_name(&self, pool: &TypePool, name: &str) -> bool {
        self.type_ids().iter().any(|&id| pool.name(id) == name)
    }

    /// All members are scalar. The empty union is not scalar: nothing is
    /// known about it.
    pub fn is_scalar(&self, pool: &TypePool) -> bool {
        !self.is_empty() && self.type_ids().iter().all(|&id| pool.is_scalar(id))
    }

    /// Any member interpolates into a string without notice. The empty
    /// union answers true: it cannot be ruled out.
    pub fn has_printable_scalar(&self, pool: &TypePool) -> bool {
        self.is_empty()
            || self
                .type_ids()
                .iter()
                .any(|&id| pool.is_printable_scalar(id))
    }

    // ===== Cast compatibility =====

    /// Whether a value of this union is acceptable where `target` is
    /// expected. Existential: one compatible branch suffices, since a
    /// union means "possibly this value". Empty on either side is
    /// acceptable: an unknown cannot be falsified.
    pub fn can_cast_to_union_type(&self, target: &UnionType, pool: &TypePool) -> bool {
        if self.is_empty() || target.is_empty() {
            return true;
        }

        if self.type_ids() == target.type_ids() {
            return true;
        }

        if pool.null_casts_as_any_type
            && (self.is_exactly(pool, "null") || target.is_exactly(pool, "null"))
        {
            return true;
        }

        if self.contains_name(pool, "mixed") || target.contains_name(pool, "mixed") {
            return true;
        }

        if self.is_exactly(pool, "int") && target.is_exactly(pool, "float") {
            return true;
        }

        self.type_ids().iter().any(|&from| {
            target
                .type_ids()
                .iter()
                .any(|&to| pool.can_cast_to_type(from, to))
        })
    }

    /// Cast check ignoring a null branch on this side.
    pub fn can_cast_to_union_type_if_non_null(&self, target: &UnionType, pool: &TypePool) -> bool {
        self.non_null_clone(pool).can_cast_to_union_type(target, pool)
    }

    fn non_null_clone(&self, pool: &TypePool) -> UnionType {
        let mut set = TypeSet::new();
        for &id in self.type_ids() {
            if pool.name(id) != "null" {
                set_insert(&mut set, id);
            }
        }
        self.with_type_set(set)
    }

    /// The inheritance-aware cast check: expand both sides to their
    /// declared ancestors first, then run the plain relation.
    pub fn can_cast_to_expanded_union_type(
        &self,
        target: &UnionType,
        pool: &mut TypePool,
        codebase: &dyn CodeBase,
    ) -> bool {
        let this = self.as_expanded_types(pool, codebase, 0);
        let that = target.as_expanded_types(pool, codebase, 0);
        this.can_cast_to_union_type(&that, pool)
    }

    /// Union of each member's expansion.
    pub fn as_expanded_types(
        &self,
        pool: &mut TypePool,
        codebase: &dyn CodeBase,
        depth: u32,
    ) -> UnionType {
        let mut set = TypeSet::new();
        for &id in self.type_ids() {
            for member in pool.expand(id, codebase, depth) {
                set_insert(&mut set, member);
            }
        }
        self.with_type_set(set)
    }

    // ===== Generic array projections =====

    /// Element types of the generic array members. When the flat `array`
    /// or `mixed` type is present the element type is unknowable and the
    /// answer is `mixed`; that short-circuit must precede the per-member
    /// filter.
    pub fn generic_array_element_types(&self, pool: &TypePool) -> UnionType {
        if self.contains_name(pool, "array") || self.contains_name(pool, "mixed") {
            let mut set = TypeSet::new();
            set_insert(&mut set, pool.from_internal_type_name("mixed"));
            return UnionType::of(set);
        }

        let mut set = TypeSet::new();
        for &id in self.type_ids() {
            if pool.is_generic(id) {
                set_insert(&mut set, pool.as_non_generic_type(id));
            }
        }
        UnionType::of(set)
    }

    /// Every member wrapped as a generic array.
    pub fn as_generic_array_types(&self, pool: &mut TypePool) -> UnionType {
        let mut set = TypeSet::new();
        for &id in self.type_ids() {
            let generic = pool.as_generic_type(id);
            set_insert(&mut set, generic);
        }
        self.with_type_set(set)
    }

    // ===== Normalization =====

    /// Collapse the `true`/`false` literal types into `bool`. Explicitly
    /// invoked; unions may otherwise hold semantically overlapping
    /// members.
    pub fn as_normalized(&self, pool: &TypePool) -> UnionType {
        let mut set = TypeSet::new();
        let mut saw_bool_literal = false;
        for &id in self.type_ids() {
            match pool.name(id) {
                "true" | "false" => saw_bool_literal = true,
                _ => set_insert(&mut set, id),
            }
        }
        if saw_bool_literal {
            set_insert(&mut set, pool.from_internal_type_name("bool"));
        }
        self.with_type_set(set)
    }

    // ===== Serialization =====

    /// Canonical string form: member strings sorted and `|`-joined, with
    /// a trailing `=` for possibly-undefined unions. This doubles as the
    /// serialization format; `from_fully_qualified_string` inverts it.
    pub fn show(&self, pool: &TypePool) -> String {
        let mut names: Vec<String> = self
            .type_ids()
            .iter()
            .map(|&id| pool.type_string(id))
            .collect();
        names.sort();

        let mut out = names.join("|");
        if self.is_possibly_undefined() {
            out.push('=');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codebase::{ClassSymbol, SymbolTable};
    use crate::fqsen::FullyQualifiedClassName;

    fn union(pool: &mut TypePool, s: &str) -> UnionType {
        UnionType::from_fully_qualified_string(pool, s)
    }

    #[test]
    fn test_round_trip() {
        let mut pool = TypePool::new();

        let original = union(&mut pool, "int|string|\\App\\User");
        let shown = original.show(&pool);
        let reparsed = UnionType::from_fully_qualified_string(&mut pool, &shown);

        assert_eq!(original, reparsed);
    }

    #[test]
    fn test_duplicates_and_blank_segments_collapse() {
        let mut pool = TypePool::new();

        let parsed = union(&mut pool, "int||int| string ");
        assert_eq!(parsed.type_count(), 2);
        assert_eq!(parsed.show(&pool), "int|string");
    }

    #[test]
    fn test_cast_reflexivity() {
        let mut pool = TypePool::new();

        let u = union(&mut pool, "int|\\App\\User");
        assert!(u.can_cast_to_union_type(&u, &pool));
    }

    #[test]
    fn test_empty_absorption() {
        let mut pool = TypePool::new();

        let u = union(&mut pool, "int|string");
        let empty = UnionType::empty();

        assert!(empty.can_cast_to_union_type(&u, &pool));
        assert!(u.can_cast_to_union_type(&empty, &pool));
    }

    #[test]
    fn test_int_to_float_not_reverse() {
        let mut pool = TypePool::new();

        let int = union(&mut pool, "int");
        let float = union(&mut pool, "float");

        assert!(int.can_cast_to_union_type(&float, &pool));
        assert!(!float.can_cast_to_union_type(&int, &pool));
    }

    #[test]
    fn test_existential_union_cast() {
        let mut pool = TypePool::new();

        // int alone can cast to float, so the union is acceptable even
        // though the class branch is not.
        let u = union(&mut pool, "int|\\App\\MyClass");
        let float = union(&mut pool, "float");

        assert!(u.can_cast_to_union_type(&float, &pool));
    }

    #[test]
    fn test_mixed_casts_both_ways() {
        let mut pool = TypePool::new();

        let mixed = union(&mut pool, "mixed");
        let int = union(&mut pool, "int");

        assert!(mixed.can_cast_to_union_type(&int, &pool));
        assert!(int.can_cast_to_union_type(&mixed, &pool));
    }

    #[test]
    fn test_null_cast_policy_flag() {
        let mut pool = TypePool::new();

        let null = union(&mut pool, "null");
        let user = union(&mut pool, "\\App\\User");

        assert!(!null.can_cast_to_union_type(&user, &pool));

        pool.null_casts_as_any_type = true;
        assert!(null.can_cast_to_union_type(&user, &pool));
        assert!(user.can_cast_to_union_type(&null, &pool));
    }

    #[test]
    fn test_can_cast_if_non_null() {
        let mut pool = TypePool::new();

        let nullable_int = union(&mut pool, "int|null");
        let float = union(&mut pool, "float");

        assert!(nullable_int.can_cast_to_union_type_if_non_null(&float, &pool));
    }

    #[test]
    fn test_empty_policy_table() {
        let pool = TypePool::new();
        let empty = UnionType::empty();

        assert!(empty.is_empty());
        assert_eq!(empty.type_count(), 0);
        assert!(!empty.is_scalar(&pool));
        // Deliberately not the vacuous answer.
        assert!(empty.has_printable_scalar(&pool));
    }

    #[test]
    fn test_possibly_undefined_marker() {
        let mut pool = TypePool::new();

        let annotated = union(&mut pool, "int|string").with_is_possibly_undefined(true);
        assert!(annotated.is_possibly_undefined());
        assert_eq!(annotated.show(&pool), "int|string=");

        let reparsed = UnionType::from_fully_qualified_string(&mut pool, "int|string=");
        assert_eq!(annotated, reparsed);

        let plain = reparsed.with_is_possibly_undefined(false);
        assert!(!plain.is_possibly_undefined());
        assert_eq!(plain.show(&pool), "int|string");
    }

    #[test]
    fn test_generic_array_element_types() {
        let mut pool = TypePool::new();

        let arrays = union(&mut pool, "int[]|string[]|\\App\\User");
        let elements = arrays.generic_array_element_types(&pool);
        assert_eq!(elements.show(&pool), "int|string");

        // The flat array short-circuit comes before the member filter.
        let with_flat = union(&mut pool, "int[]|array");
        assert_eq!(
            with_flat.generic_array_element_types(&pool).show(&pool),
            "mixed"
        );
    }

    #[test]
    fn test_as_generic_array_types() {
        let mut pool = TypePool::new();

        let u = union(&mut pool, "int|\\App\\User");
        assert_eq!(u.as_generic_array_types(&mut pool).show(&pool), "\\App\\User[]|int[]");

        let collapsing = union(&mut pool, "array|mixed");
        assert_eq!(collapsing.as_generic_array_types(&mut pool).show(&pool), "array");
    }

    #[test]
    fn test_as_normalized_collapses_bool_literals() {
        let mut pool = TypePool::new();

        let t = pool.from_namespace_and_name("\\", "true");
        let f = pool.from_namespace_and_name("\\", "false");
        let int = pool.from_internal_type_name("int");

        let u = UnionType::of(TypeSet::from_slice(&[t, f, int])).as_normalized(&pool);
        assert_eq!(u.show(&pool), "bool|int");
    }

    #[test]
    fn test_expanded_cast_sees_ancestors() {
        let mut pool = TypePool::new();
        let mut codebase = SymbolTable::new();

        let base = pool.from_fully_qualified_string("\\App\\Base");
        let mut child_class =
            ClassSymbol::new(FullyQualifiedClassName::from_fully_qualified_string("\\App\\Child"));
        child_class.union_type = UnionType::empty().with_type(base);
        codebase.add_class(child_class);

        let child = union(&mut pool, "\\App\\Child");
        let base_target = union(&mut pool, "\\App\\Base");

        assert!(child.can_cast_to_expanded_union_type(&base_target, &mut pool, &codebase));
    }

    #[test]
    fn test_from_string_in_context_resolves_each_segment() {
        use crate::env::{new_global_variable_map, Scope};
        use crate::fqsen::{Fqsen, FullyQualifiedClassName, UseKind};

        let mut pool = TypePool::new();
        let context = crate::env::Context::new(Scope::new(new_global_variable_map()))
            .with_namespace("\\Baz")
            .with_namespace_map_entry(
                UseKind::Class,
                "foo",
                Fqsen::Class(FullyQualifiedClassName::from_fully_qualified_string(
                    "\\Bar\\Foo",
                )),
            );

        let parsed = UnionType::from_string_in_context(&mut pool, "int|Foo|Widget", &context);
        assert_eq!(parsed.show(&pool), "\\Bar\\foo|\\Baz\\Widget|int");
    }

    #[test]
    fn test_incremental_accumulation() {
        let mut pool = TypePool::new();

        let int = pool.from_internal_type_name("int");
        let string = pool.from_internal_type_name("string");

        let mut u = UnionType::empty();
        assert!(u.is_empty());

        u.add_type(int);
        u.add_type(string);
        u.add_type(int);

        assert_eq!(u.type_count(), 2);
        assert!(u.has_type(int));
        assert!(u.has_type(string));
    }
}
