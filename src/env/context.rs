//! Context - the lexical snapshot used to resolve names
//!
//! A context captures everything name resolution needs at one point in
//! a program: current file and line range, current namespace and `use`
//! alias map, the class/method/closure scope if any, the strict-types
//! mode, and the variable scope. Contexts are immutable; every `with_*`
//! returns a new snapshot.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::codebase::{ClassSymbol, CodeBase, FunctionSymbol, MethodSymbol};
use crate::env::scope::{Scope, Variable};
use crate::fqsen::{
    Fqsen, FullyQualifiedClassName, FullyQualifiedFunctionName, FunctionLikeFqsen, UseKind,
};

/// A file plus the line range currently being analyzed. Serializes as
/// `file:line_start:line_end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub file: String,
    pub line_start: u32,
    pub line_end: u32,
}

impl FileRef {
    pub fn unknown() -> Self {
        Self {
            file: String::new(),
            line_start: 0,
            line_end: 0,
        }
    }

    pub fn from_serialized_string(serialized: &str) -> Result<Self, ContextDecodeError> {
        // The file name may itself contain ':'; the two line fields are
        // the rightmost segments.
        let mut fields = serialized.rsplitn(3, ':');
        let line_end = fields.next().ok_or_else(|| bad(serialized))?;
        let line_start = fields.next().ok_or_else(|| bad(serialized))?;
        let file = fields.next().ok_or_else(|| bad(serialized))?;

        Ok(Self {
            file: file.to_string(),
            line_start: line_start.parse().map_err(|_| bad(serialized))?,
            line_end: line_end.parse().map_err(|_| bad(serialized))?,
        })
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line_start, self.line_end)
    }
}

/// A serialized context string did not match the
/// `file:start:end^ns|cond|class|method|closure` format.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid context string: {0:?}")]
pub struct ContextDecodeError(pub String);

fn bad(s: &str) -> ContextDecodeError {
    ContextDecodeError(s.to_string())
}

/// The lexical + namespace + scope snapshot for one analysis point.
#[derive(Debug, Clone)]
pub struct Context {
    file_ref: FileRef,
    namespace: String,
    namespace_map: HashMap<(UseKind, String), Fqsen>,
    class_fqsen: Option<FullyQualifiedClassName>,
    method_fqsen: Option<FunctionLikeFqsen>,
    closure_fqsen: Option<FullyQualifiedFunctionName>,
    is_conditional: bool,
    strict_types: bool,
    scope: Scope,
}

impl Context {
    pub fn new(scope: Scope) -> Self {
        Self {
            file_ref: FileRef::unknown(),
            namespace: "\\".to_string(),
            namespace_map: HashMap::new(),
            class_fqsen: None,
            method_fqsen: None,
            closure_fqsen: None,
            is_conditional: false,
            strict_types: false,
            scope,
        }
    }

    // ===== Accessors =====

    pub fn file(&self) -> &str {
        &self.file_ref.file
    }

    pub fn file_ref(&self) -> &FileRef {
        &self.file_ref
    }

    pub fn line_start(&self) -> u32 {
        self.file_ref.line_start
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn namespace_map_entry(&self, kind: UseKind, alias: &str) -> Option<&Fqsen> {
        self.namespace_map.get(&(kind, alias.to_string()))
    }

    pub fn class_fqsen(&self) -> Option<&FullyQualifiedClassName> {
        self.class_fqsen.as_ref()
    }

    pub fn method_fqsen(&self) -> Option<&FunctionLikeFqsen> {
        self.method_fqsen.as_ref()
    }

    pub fn closure_fqsen(&self) -> Option<&FullyQualifiedFunctionName> {
        self.closure_fqsen.as_ref()
    }

    pub fn is_in_class_scope(&self) -> bool {
        self.class_fqsen.is_some()
    }

    pub fn is_in_method_scope(&self) -> bool {
        self.method_fqsen.is_some()
    }

    pub fn is_conditional(&self) -> bool {
        self.is_conditional
    }

    pub fn is_strict_types(&self) -> bool {
        self.strict_types
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        &mut self.scope
    }

    // ===== Copy-on-write updates =====

    pub fn with_file(&self, file: &str) -> Context {
        let mut context = self.clone();
        context.file_ref.file = file.to_string();
        context
    }

    pub fn with_line_range(&self, line_start: u32, line_end: u32) -> Context {
        let mut context = self.clone();
        context.file_ref.line_start = line_start;
        context.file_ref.line_end = line_end;
        context
    }

    pub fn with_namespace(&self, namespace: &str) -> Context {
        assert!(
            namespace.starts_with('\\'),
            "namespace must start with the namespace separator: {:?}",
            namespace
        );
        let mut context = self.clone();
        context.namespace = namespace.to_string();
        context
    }

    pub fn with_namespace_map(
        &self,
        namespace_map: HashMap<(UseKind, String), Fqsen>,
    ) -> Context {
        let mut context = self.clone();
        context.namespace_map = namespace_map;
        context
    }

    /// Record one `use` alias. The alias is matched case-insensitively.
    pub fn with_namespace_map_entry(&self, kind: UseKind, alias: &str, target: Fqsen) -> Context {
        let mut context = self.clone();
        context
            .namespace_map
            .insert((kind, alias.to_lowercase()), target);
        context
    }

    pub fn with_class_fqsen(&self, fqsen: Option<FullyQualifiedClassName>) -> Context {
        let mut context = self.clone();
        context.class_fqsen = fqsen;
        context
    }

    pub fn with_method_fqsen(&self, fqsen: Option<FunctionLikeFqsen>) -> Context {
        let mut context = self.clone();
        context.method_fqsen = fqsen;
        context
    }

    pub fn with_closure_fqsen(&self, fqsen: Option<FullyQualifiedFunctionName>) -> Context {
        let mut context = self.clone();
        context.closure_fqsen = fqsen;
        context
    }

    pub fn with_is_conditional(&self, is_conditional: bool) -> Context {
        let mut context = self.clone();
        context.is_conditional = is_conditional;
        context
    }

    pub fn with_strict_types(&self, strict_types: bool) -> Context {
        let mut context = self.clone();
        context.strict_types = strict_types;
        context
    }

    pub fn with_scope(&self, scope: Scope) -> Context {
        let mut context = self.clone();
        context.scope = scope;
        context
    }

    pub fn with_variable(&self, variable: Variable) -> Context {
        let mut context = self.clone();
        context.scope = context.scope.with_variable(variable);
        context
    }

    // ===== Scope lookups =====

    /// The class symbol this context is inside of. Being "in scope" with
    /// no matching symbol-table entry is an invariant violation, not a
    /// recoverable condition.
    pub fn get_class_in_scope<'a>(&self, codebase: &'a dyn CodeBase) -> &'a ClassSymbol {
        let fqsen = self
            .class_fqsen
            .as_ref()
            .unwrap_or_else(|| panic!("context is not in a class scope"));
        codebase.get_class_by_fqsen(fqsen).unwrap_or_else(|| {
            panic!("class {} is in scope but not in the code base", fqsen)
        })
    }

    pub fn get_method_in_scope<'a>(&self, codebase: &'a dyn CodeBase) -> &'a MethodSymbol {
        let fqsen = match &self.method_fqsen {
            Some(FunctionLikeFqsen::Method(fqsen)) => fqsen,
            _ => panic!("context is not in a method scope"),
        };
        codebase.get_method_by_fqsen(fqsen).unwrap_or_else(|| {
            panic!("method {} is in scope but not in the code base", fqsen)
        })
    }

    pub fn get_closure_in_scope<'a>(&self, codebase: &'a dyn CodeBase) -> &'a FunctionSymbol {
        let fqsen = self
            .closure_fqsen
            .as_ref()
            .unwrap_or_else(|| panic!("context is not in a closure scope"));
        codebase.get_function_by_fqsen(fqsen).unwrap_or_else(|| {
            panic!("closure {} is in scope but not in the code base", fqsen)
        })
    }

    // ===== Serialization =====

    /// Positional serialization:
    /// `file:line_start:line_end^namespace|is_conditional|class|method|closure`.
    /// Field order and delimiters are an exact-format contract for any
    /// persisted state read back across runs.
    pub fn to_serialized_string(&self) -> String {
        let field = |s: Option<String>| s.unwrap_or_default();
        format!(
            "{}^{}|{}|{}|{}|{}",
            self.file_ref,
            self.namespace,
            u32::from(self.is_conditional),
            field(self.class_fqsen.as_ref().map(|f| f.to_string())),
            field(self.method_fqsen.as_ref().map(|f| f.to_string())),
            field(self.closure_fqsen.as_ref().map(|f| f.to_string())),
        )
    }

    pub fn from_serialized_string(
        serialized: &str,
        scope: Scope,
    ) -> Result<Context, ContextDecodeError> {
        let (file_part, rest) = serialized.split_once('^').ok_or_else(|| bad(serialized))?;
        let file_ref = FileRef::from_serialized_string(file_part)?;

        let fields: Vec<&str> = rest.split('|').collect();
        let [namespace, conditional, class, method, closure] = fields.as_slice() else {
            return Err(bad(serialized));
        };

        if !namespace.starts_with('\\') {
            return Err(bad(serialized));
        }
        let is_conditional = match *conditional {
            "0" => false,
            "1" => true,
            _ => return Err(bad(serialized)),
        };

        let class_fqsen = if class.is_empty() {
            None
        } else if well_formed(class) {
            Some(FullyQualifiedClassName::from_fully_qualified_string(class))
        } else {
            return Err(bad(serialized));
        };

        let method_fqsen = if method.is_empty() {
            None
        } else if method_well_formed(method) {
            Some(FunctionLikeFqsen::from_fully_qualified_string(method))
        } else {
            return Err(bad(serialized));
        };

        let closure_fqsen = if closure.is_empty() {
            None
        } else if well_formed(closure) {
            Some(FullyQualifiedFunctionName::from_fully_qualified_string(
                closure,
            ))
        } else {
            return Err(bad(serialized));
        };

        Ok(Context {
            file_ref,
            namespace: namespace.to_string(),
            namespace_map: HashMap::new(),
            class_fqsen,
            method_fqsen,
            closure_fqsen,
            is_conditional,
            strict_types: false,
            scope,
        })
    }
}

fn well_formed(fqsen: &str) -> bool {
    fqsen.starts_with('\\') && !fqsen.ends_with('\\')
}

fn method_well_formed(fqsen: &str) -> bool {
    match fqsen.split_once("::") {
        Some((class, name)) => well_formed(class) && !name.is_empty(),
        None => well_formed(fqsen),
    }
}
