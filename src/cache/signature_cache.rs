//! Signature Cache - bincode persistence of the signature tables
//!
//! Signature tables may be extended from user-provided stub files in a
//! future run mode, so the assembled maps are cached to disk and
//! revalidated against the crate version on load.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::signatures::{FunctionSignature, SignatureMaps};

/// Binary cache for the signature tables.
#[derive(Serialize, Deserialize, Debug)]
pub struct SignatureCache {
    /// TypeRay version that wrote the cache.
    pub version: String,
    /// Cached function signatures, keyed with the alternate suffix
    /// convention intact.
    pub functions: Vec<SerializableFunctionSignature>,
    /// Cached class property types.
    pub classes: Vec<SerializableClassSignature>,
    /// Cache creation timestamp.
    pub timestamp: SystemTime,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SerializableFunctionSignature {
    pub key: String,
    pub return_type: String,
    pub parameters: Vec<(String, String)>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SerializableClassSignature {
    pub class: String,
    pub properties: Vec<(String, String)>,
}

impl SignatureCache {
    /// Get cache file path
    pub fn cache_path() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .context("Failed to get cache directory")?
            .join("typeray");

        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        Ok(cache_dir.join("signature_cache.bin"))
    }

    /// Load cache from disk
    pub fn load() -> Result<Self> {
        let path = Self::cache_path()?;
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read cache from {}", path.display()))?;

        bincode::deserialize(&bytes).context("Failed to deserialize cache")
    }

    /// Save cache to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::cache_path()?;
        let bytes = bincode::serialize(self).context("Failed to serialize cache")?;

        fs::write(&path, bytes)
            .with_context(|| format!("Failed to write cache to {}", path.display()))?;

        Ok(())
    }

    /// Check if cache is valid
    pub fn is_valid(&self, current_version: &str) -> bool {
        self.version == current_version
    }

    /// Build a cache snapshot from assembled signature maps.
    pub fn from_maps(maps: &SignatureMaps, version: String) -> Self {
        let functions = maps
            .functions_iter()
            .map(|(key, signature)| SerializableFunctionSignature {
                key: key.clone(),
                return_type: signature.return_type.clone(),
                parameters: signature.parameters.clone(),
            })
            .collect();

        let classes = maps
            .classes_iter()
            .map(|(class, properties)| SerializableClassSignature {
                class: class.clone(),
                properties: properties
                    .iter()
                    .map(|(name, ty)| (name.clone(), ty.clone()))
                    .collect(),
            })
            .collect();

        Self {
            version,
            functions,
            classes,
            timestamp: SystemTime::now(),
        }
    }

    /// Rebuild signature maps from the cached snapshot.
    pub fn to_maps(&self) -> SignatureMaps {
        let mut maps = SignatureMaps::default();

        for entry in &self.functions {
            maps.insert_function(
                &entry.key,
                FunctionSignature {
                    return_type: entry.return_type.clone(),
                    parameters: entry.parameters.clone(),
                },
            );
        }

        for entry in &self.classes {
            let properties: HashMap<String, String> = entry
                .properties
                .iter()
                .map(|(name, ty)| (name.clone(), ty.clone()))
                .collect();
            maps.insert_class(&entry.class, properties);
        }

        maps
    }
}

/// Load the signature maps from a valid cache, rebuilding and re-caching
/// from the embedded tables otherwise.
pub fn load_or_rebuild() -> SignatureMaps {
    let version = env!("CARGO_PKG_VERSION");

    if let Ok(cache) = SignatureCache::load() {
        if cache.is_valid(version) {
            return cache.to_maps();
        }
        eprintln!("Signature cache is stale, rebuilding...");
    }

    let maps = SignatureMaps::internal();
    let cache = SignatureCache::from_maps(&maps, version.to_string());
    if let Err(error) = cache.save() {
        eprintln!("Warning: failed to save signature cache: {}", error);
    }

    maps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_serialization_round_trip() {
        let maps = SignatureMaps::internal();
        let cache = SignatureCache::from_maps(&maps, "0.1.0".to_string());

        let bytes = bincode::serialize(&cache).unwrap();
        let deserialized: SignatureCache = bincode::deserialize(&bytes).unwrap();

        assert_eq!(deserialized.version, "0.1.0");

        let restored = deserialized.to_maps();
        assert_eq!(restored.function_count(), maps.function_count());
        assert_eq!(
            restored.function_signatures("implode").len(),
            maps.function_signatures("implode").len()
        );
        assert_eq!(restored.property_type("exception", "code"), Some("int"));
    }

    #[test]
    fn test_cache_validation() {
        let cache = SignatureCache {
            version: "0.1.0".to_string(),
            functions: vec![],
            classes: vec![],
            timestamp: SystemTime::now(),
        };

        assert!(cache.is_valid("0.1.0"));
        assert!(!cache.is_valid("0.2.0"));
    }
}
