//! Code Base - the symbol-table contract
//!
//! Type expansion and scope lookups consume this trait; the analyzer
//! proper populates an implementation while parsing declarations. The
//! in-memory `SymbolTable` below is the implementation used by the CLI
//! harness and the tests.

use std::collections::HashMap;

use crate::fqsen::{
    FullyQualifiedClassName, FullyQualifiedFunctionName, FullyQualifiedMethodName,
    FullyQualifiedPropertyName,
};
use crate::types::UnionType;

/// A class known to the symbol table. `union_type` is the class's own
/// declared union: parent class, interfaces, and phpdoc mixins, as
/// written. Method and property keys follow FQSEN canonicalization
/// (methods lowercase, properties case-sensitive).
#[derive(Debug, Clone)]
pub struct ClassSymbol {
    pub fqsen: FullyQualifiedClassName,
    pub union_type: UnionType,
    pub methods: HashMap<String, MethodSymbol>,
    pub properties: HashMap<String, PropertySymbol>,
}

impl ClassSymbol {
    pub fn new(fqsen: FullyQualifiedClassName) -> Self {
        Self {
            fqsen,
            union_type: UnionType::empty(),
            methods: HashMap::new(),
            properties: HashMap::new(),
        }
    }

    pub fn add_method(&mut self, name: &str, return_type: UnionType) {
        let fqsen = FullyQualifiedMethodName::from_class_and_name(self.fqsen.clone(), name);
        self.methods.insert(
            fqsen.name().to_string(),
            MethodSymbol { fqsen, return_type },
        );
    }

    pub fn add_property(&mut self, name: &str, union_type: UnionType) {
        let fqsen = FullyQualifiedPropertyName::from_class_and_name(self.fqsen.clone(), name);
        self.properties.insert(
            name.to_string(),
            PropertySymbol { fqsen, union_type },
        );
    }
}

#[derive(Debug, Clone)]
pub struct MethodSymbol {
    pub fqsen: FullyQualifiedMethodName,
    pub return_type: UnionType,
}

#[derive(Debug, Clone)]
pub struct PropertySymbol {
    pub fqsen: FullyQualifiedPropertyName,
    pub union_type: UnionType,
}

#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub fqsen: FullyQualifiedFunctionName,
    pub return_type: UnionType,
}

/// Symbol lookup contract consumed by type expansion and context scope
/// resolution.
pub trait CodeBase {
    fn has_class_with_fqsen(&self, fqsen: &FullyQualifiedClassName) -> bool;
    fn get_class_by_fqsen(&self, fqsen: &FullyQualifiedClassName) -> Option<&ClassSymbol>;

    fn has_function_with_fqsen(&self, fqsen: &FullyQualifiedFunctionName) -> bool;
    fn get_function_by_fqsen(&self, fqsen: &FullyQualifiedFunctionName)
        -> Option<&FunctionSymbol>;

    /// Method lookup routes through the owning class's method map.
    fn get_method_by_fqsen(&self, fqsen: &FullyQualifiedMethodName) -> Option<&MethodSymbol> {
        self.get_class_by_fqsen(fqsen.class())
            .and_then(|class| class.methods.get(fqsen.name()))
    }
}

/// In-memory symbol table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    classes: HashMap<FullyQualifiedClassName, ClassSymbol>,
    functions: HashMap<FullyQualifiedFunctionName, FunctionSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_class(&mut self, class: ClassSymbol) {
        self.classes.insert(class.fqsen.clone(), class);
    }

    pub fn add_function(&mut self, function: FunctionSymbol) {
        self.functions.insert(function.fqsen.clone(), function);
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}

impl CodeBase for SymbolTable {
    fn has_class_with_fqsen(&self, fqsen: &FullyQualifiedClassName) -> bool {
        self.classes.contains_key(fqsen)
    }

    fn get_class_by_fqsen(&self, fqsen: &FullyQualifiedClassName) -> Option<&ClassSymbol> {
        self.classes.get(fqsen)
    }

    fn has_function_with_fqsen(&self, fqsen: &FullyQualifiedFunctionName) -> bool {
        self.functions.contains_key(fqsen)
    }

    fn get_function_by_fqsen(
        &self,
        fqsen: &FullyQualifiedFunctionName,
    ) -> Option<&FunctionSymbol> {
        self.functions.get(fqsen)
    }
}
