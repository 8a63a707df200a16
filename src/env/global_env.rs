//! Global environment: facade for one analysis session
//!
//! Owns every cache the original kept in process-wide static state: the
//! type interning pool, the shared superglobal map, the symbol table,
//! and the signature tables. Parallel workers each build their own
//! GlobalEnv; nothing here is shared across sessions.

use std::rc::Rc;

use crate::analyzer;
use crate::ast::Node;
use crate::cache;
use crate::codebase::SymbolTable;
use crate::diagnostics::Issue;
use crate::env::context::Context;
use crate::env::scope::{new_global_variable_map, variable_flags, GlobalVariableMap, Scope, Variable};
use crate::signatures::SignatureMaps;
use crate::types::{TypePool, UnionType};

/// Analysis policy knobs.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// A union that is exactly `null` casts to anything.
    pub null_casts_as_any_type: bool,
    /// Swallow resolution failures into the empty union (recording the
    /// issue) instead of returning them to the caller.
    pub should_catch_issue_exception: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            null_casts_as_any_type: false,
            should_catch_issue_exception: true,
        }
    }
}

/// One analysis session: caches, symbol table, options, and the issues
/// collected so far.
pub struct GlobalEnv {
    pub pool: TypePool,
    pub symbol_table: SymbolTable,
    pub signatures: SignatureMaps,
    pub issues: Vec<Issue>,
    pub options: Options,
    globals: GlobalVariableMap,
}

impl GlobalEnv {
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    pub fn with_options(options: Options) -> Self {
        let mut pool = TypePool::new();
        pool.null_casts_as_any_type = options.null_casts_as_any_type;

        let mut genv = Self {
            pool,
            symbol_table: SymbolTable::new(),
            signatures: SignatureMaps::internal(),
            issues: Vec::new(),
            options,
            globals: new_global_variable_map(),
        };
        genv.seed_superglobals();
        genv
    }

    /// Like `new`, but loads the signature tables through the on-disk
    /// cache (the CLI path).
    pub fn with_cached_signatures() -> Self {
        let mut genv = Self::new();
        genv.signatures = cache::load_or_rebuild();
        genv
    }

    /// The runtime-defined superglobals every scope can see.
    fn seed_superglobals(&mut self) {
        let array = UnionType::empty().with_type(self.pool.from_internal_type_name("array"));
        let mut globals = self.globals.borrow_mut();

        for name in [
            "GLOBALS", "_GET", "_POST", "_COOKIE", "_FILES", "_ENV", "_REQUEST", "_SERVER",
            "_SESSION",
        ] {
            globals.insert(
                name.to_string(),
                Variable::new(name, array.clone()).with_flags(variable_flags::IS_SUPERGLOBAL),
            );
        }
    }

    /// A fresh file-scope context wired to this session's superglobals.
    pub fn new_context(&self) -> Context {
        Context::new(Scope::new(Rc::clone(&self.globals)))
    }

    pub fn globals(&self) -> GlobalVariableMap {
        Rc::clone(&self.globals)
    }

    /// Resolve a node's type. With `should_catch_issue_exception` set,
    /// resolution failures are recorded and degrade to the empty union;
    /// otherwise they surface to the caller.
    pub fn resolve_node_type(
        &mut self,
        context: &mut Context,
        node: &Node,
    ) -> Result<UnionType, Issue> {
        match analyzer::node_union_type(
            &mut self.pool,
            &self.symbol_table,
            &self.signatures,
            context,
            node,
        ) {
            Ok(union) => Ok(union),
            Err(issue) if self.options.should_catch_issue_exception => {
                self.issues.push(issue);
                Ok(UnionType::empty())
            }
            Err(issue) => Err(issue),
        }
    }

    /// Parse a fully-qualified union type string.
    pub fn union_type_from_string(&mut self, union_string: &str) -> UnionType {
        UnionType::from_fully_qualified_string(&mut self.pool, union_string)
    }
}

impl Default for GlobalEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;

    #[test]
    fn test_unresolved_variable_degrades_to_empty() {
        let mut genv = GlobalEnv::new();
        let mut context = genv.new_context();

        let node = Node::new(NodeKind::Variable("undefined".to_string()), 4);
        let union = genv.resolve_node_type(&mut context, &node).unwrap();

        assert!(union.is_empty());
        assert_eq!(genv.issues.len(), 1);
        assert_eq!(
            genv.issues[0],
            Issue::UndefinedVariable {
                name: "undefined".to_string(),
                line: 4,
            }
        );
    }

    #[test]
    fn test_uncaught_mode_surfaces_the_issue() {
        let mut genv = GlobalEnv::with_options(Options {
            should_catch_issue_exception: false,
            ..Options::default()
        });
        let mut context = genv.new_context();

        let node = Node::new(NodeKind::Variable("undefined".to_string()), 4);
        assert!(genv.resolve_node_type(&mut context, &node).is_err());
        assert!(genv.issues.is_empty());
    }

    #[test]
    fn test_superglobals_are_always_in_scope() {
        let mut genv = GlobalEnv::new();
        let mut context = genv.new_context();

        let node = Node::new(NodeKind::Variable("_GET".to_string()), 1);
        let union = genv.resolve_node_type(&mut context, &node).unwrap();

        assert_eq!(union.show(&genv.pool), "array");
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut a = GlobalEnv::new();
        let mut b = GlobalEnv::new();

        let mut context = a.new_context();
        let node = Node::new(
            NodeKind::Assignment {
                variable: "x".to_string(),
                value: Box::new(Node::new(NodeKind::IntLiteral(1), 1)),
            },
            1,
        );
        a.resolve_node_type(&mut context, &node).unwrap();

        let mut other_context = b.new_context();
        let read = Node::new(NodeKind::Variable("x".to_string()), 2);
        let union = b.resolve_node_type(&mut other_context, &read).unwrap();

        assert!(union.is_empty());
        assert_eq!(b.issues.len(), 1);
    }

    #[test]
    fn test_null_cast_option_reaches_the_pool() {
        let mut genv = GlobalEnv::with_options(Options {
            null_casts_as_any_type: true,
            ..Options::default()
        });

        let null = genv.union_type_from_string("null");
        let user = genv.union_type_from_string("\\App\\User");
        assert!(null.can_cast_to_union_type(&user, &genv.pool));
    }
}
