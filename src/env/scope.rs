//! Scope - variable bindings
//!
//! A scope is a local variable map layered over a superglobal map that
//! is shared by handle across every scope of one analysis session.
//! Lookup checks local bindings first, then the superglobal map.
//! Importing ordinary globals into a local scope is an explicit, one-time
//! operation, never automatic delegation.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::types::UnionType;

/// Variable flag bits.
pub mod variable_flags {
    pub const NONE: u32 = 0;
    /// Bound by reference (`&$var` parameters).
    pub const IS_REFERENCE: u32 = 1 << 0;
    /// Lives in the shared superglobal map.
    pub const IS_SUPERGLOBAL: u32 = 1 << 1;
}

/// A named variable binding.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub union_type: UnionType,
    pub flags: u32,
}

impl Variable {
    pub fn new(name: &str, union_type: UnionType) -> Self {
        Self {
            name: name.to_string(),
            union_type,
            flags: variable_flags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }
}

/// The superglobal map, shared by handle across a session's scopes.
/// Owned by the session facade, never a process-global static, so that
/// parallel workers and repeated test runs stay isolated.
pub type GlobalVariableMap = Rc<RefCell<HashMap<String, Variable>>>;

pub fn new_global_variable_map() -> GlobalVariableMap {
    Rc::new(RefCell::new(HashMap::new()))
}

/// Variable bindings for one lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    variables: HashMap<String, Variable>,
    globals: GlobalVariableMap,
}

impl Scope {
    pub fn new(globals: GlobalVariableMap) -> Self {
        Self {
            variables: HashMap::new(),
            globals,
        }
    }

    /// Local bindings first, then the shared superglobal map.
    pub fn has_variable_with_name(&self, name: &str) -> bool {
        self.variables.contains_key(name) || self.globals.borrow().contains_key(name)
    }

    pub fn get_variable_with_name(&self, name: &str) -> Option<Variable> {
        if let Some(variable) = self.variables.get(name) {
            return Some(variable.clone());
        }
        self.globals.borrow().get(name).cloned()
    }

    /// Copy-on-write bind: a new scope with one entry replaced.
    pub fn with_variable(&self, variable: Variable) -> Scope {
        let mut scope = self.clone();
        scope.variables.insert(variable.name.clone(), variable);
        scope
    }

    /// In-place bind into an already-published scope. Use with caution:
    /// this is the escape hatch from copy-on-write for hot loops.
    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Bind locally and publish into the shared superglobal map, making
    /// the variable visible to every scope that has not overridden it.
    pub fn with_global_variable(&self, variable: Variable) -> Scope {
        let flags = variable.flags | variable_flags::IS_SUPERGLOBAL;
        let variable = variable.with_flags(flags);
        self.globals
            .borrow_mut()
            .insert(variable.name.clone(), variable.clone());
        self.with_variable(variable)
    }

    /// Snapshot every superglobal into the local map. Called once at
    /// file-scope entry; later changes to the global map do not rebind
    /// the copies.
    pub fn with_globals_imported(&self) -> Scope {
        let mut scope = self.clone();
        for (name, variable) in self.globals.borrow().iter() {
            scope
                .variables
                .entry(name.clone())
                .or_insert_with(|| variable.clone());
        }
        scope
    }

    pub fn globals(&self) -> GlobalVariableMap {
        Rc::clone(&self.globals)
    }

    pub fn local_variable_count(&self) -> usize {
        self.variables.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str) -> Variable {
        Variable::new(name, UnionType::empty())
    }

    #[test]
    fn test_lookup_checks_local_then_global() {
        let globals = new_global_variable_map();
        globals
            .borrow_mut()
            .insert("_GET".to_string(), variable("_GET"));

        let scope = Scope::new(Rc::clone(&globals));
        assert!(scope.has_variable_with_name("_GET"));
        assert!(!scope.has_variable_with_name("x"));

        let scope = scope.with_variable(variable("x"));
        assert!(scope.has_variable_with_name("x"));
    }

    #[test]
    fn test_with_variable_is_copy_on_write() {
        let scope = Scope::new(new_global_variable_map());
        let bound = scope.with_variable(variable("x"));

        assert!(!scope.has_variable_with_name("x"));
        assert!(bound.has_variable_with_name("x"));
    }

    #[test]
    fn test_add_variable_mutates_in_place() {
        let mut scope = Scope::new(new_global_variable_map());
        scope.add_variable(variable("x"));

        assert!(scope.has_variable_with_name("x"));
    }

    #[test]
    fn test_global_variable_is_visible_to_sibling_scopes() {
        let globals = new_global_variable_map();
        let a = Scope::new(Rc::clone(&globals));
        let b = Scope::new(Rc::clone(&globals));

        let a = a.with_global_variable(variable("shared"));
        assert!(a.has_variable_with_name("shared"));
        assert!(b.has_variable_with_name("shared"));

        let bound = a.get_variable_with_name("shared").unwrap();
        assert_ne!(bound.flags & variable_flags::IS_SUPERGLOBAL, 0);
    }

    #[test]
    fn test_local_binding_shadows_global() {
        let globals = new_global_variable_map();
        globals.borrow_mut().insert(
            "name".to_string(),
            Variable::new("name", UnionType::empty())
                .with_flags(variable_flags::IS_SUPERGLOBAL),
        );

        let scope = Scope::new(globals);
        let scope = scope.with_variable(variable("name"));

        let bound = scope.get_variable_with_name("name").unwrap();
        assert_eq!(bound.flags, variable_flags::NONE);
    }

    #[test]
    fn test_globals_imported_is_a_one_time_snapshot() {
        let globals = new_global_variable_map();
        globals
            .borrow_mut()
            .insert("early".to_string(), variable("early"));

        let scope = Scope::new(Rc::clone(&globals)).with_globals_imported();
        assert_eq!(scope.local_variable_count(), 1);

        globals
            .borrow_mut()
            .insert("late".to_string(), variable("late"));

        // The late global is still reachable through the fallback, but
        // was never copied into the local map.
        assert!(scope.has_variable_with_name("late"));
        assert_eq!(scope.local_variable_count(), 1);
    }
}
