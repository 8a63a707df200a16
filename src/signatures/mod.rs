//! Signature Tables - preloaded types for built-in functions and classes
//!
//! Two read-only maps loaded once per session: function name to return
//! and parameter type strings, and class name to property type strings.
//! Overloaded built-ins chain alternate signatures under keys with a
//! trailing apostrophe + integer suffix (`implode`, `implode'1`, ...);
//! lookup follows the chain until the first missing key.

mod data;

use std::collections::HashMap;

use crate::types::{TypePool, UnionType};

/// One declared signature: a return type string plus ordered named
/// parameters with their type strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSignature {
    pub return_type: String,
    pub parameters: Vec<(String, String)>,
}

/// The preloaded signature maps. Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct SignatureMaps {
    functions: HashMap<String, FunctionSignature>,
    class_properties: HashMap<String, HashMap<String, String>>,
}

impl SignatureMaps {
    /// Build from the embedded seed tables.
    pub fn internal() -> Self {
        let mut maps = Self::default();

        for (key, return_type, parameters) in data::FUNCTION_SIGNATURES {
            maps.insert_function(
                key,
                FunctionSignature {
                    return_type: (*return_type).to_string(),
                    parameters: parameters
                        .iter()
                        .map(|(name, ty)| ((*name).to_string(), (*ty).to_string()))
                        .collect(),
                },
            );
        }

        for (class, properties) in data::CLASS_SIGNATURES {
            let map = properties
                .iter()
                .map(|(name, ty)| ((*name).to_string(), (*ty).to_string()))
                .collect();
            maps.class_properties.insert((*class).to_string(), map);
        }

        maps
    }

    pub(crate) fn insert_function(&mut self, key: &str, signature: FunctionSignature) {
        self.functions.insert(key.to_lowercase(), signature);
    }

    pub(crate) fn insert_class(&mut self, class: &str, properties: HashMap<String, String>) {
        self.class_properties
            .insert(class.to_lowercase(), properties);
    }

    /// All signatures for a function: the base entry plus any alternate
    /// chain. An unknown name yields an empty list.
    pub fn function_signatures(&self, name: &str) -> Vec<&FunctionSignature> {
        let key = name.to_lowercase();
        let mut signatures = Vec::new();

        let Some(base) = self.functions.get(&key) else {
            return signatures;
        };
        signatures.push(base);

        for alternate_id in 1.. {
            match self.functions.get(&format!("{}'{}", key, alternate_id)) {
                Some(signature) => signatures.push(signature),
                None => break,
            }
        }

        signatures
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_lowercase())
    }

    /// Union of the return types across a function's signature chain.
    pub fn function_return_union_type(&self, pool: &mut TypePool, name: &str) -> UnionType {
        let mut union = UnionType::empty();
        for signature in self.function_signatures(name) {
            let parsed = UnionType::from_fully_qualified_string(pool, &signature.return_type);
            union.add_union_type(&parsed);
        }
        union
    }

    /// Declared type string of a built-in class property.
    pub fn property_type(&self, class: &str, property: &str) -> Option<&str> {
        self.class_properties
            .get(&class.to_lowercase())
            .and_then(|properties| properties.get(property))
            .map(String::as_str)
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    pub(crate) fn functions_iter(&self) -> impl Iterator<Item = (&String, &FunctionSignature)> {
        self.functions.iter()
    }

    pub(crate) fn classes_iter(
        &self,
    ) -> impl Iterator<Item = (&String, &HashMap<String, String>)> {
        self.class_properties.iter()
    }
}
