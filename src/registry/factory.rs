//! Factory functions for looking up category registries
//!
//! Shipped catalogs are addressed by name. Catalogs defined outside the crate
//! are loaded from JSON files.

use std::path::Path;
use std::sync::Arc;

use super::CategoryRegistry;
use crate::error::{PrevalenceError, Result};

/// Names accepted by [`registry_from_name`]
#[must_use]
pub const fn available_registries() -> &'static [&'static str] {
    &["icd10", "atc"]
}

/// Look up a shipped registry by name
pub fn registry_from_name(name: &str) -> Result<&'static CategoryRegistry> {
    match name.to_lowercase().as_str() {
        "icd10" | "icd10cm" | "icd10_chapters" => Ok(super::icd10::chapters()),
        "atc" | "atc_main_groups" => Ok(super::atc::main_groups()),
        _ => Err(PrevalenceError::InvalidRegistry(format!(
            "Unknown registry: {name} (available: {})",
            available_registries().join(", ")
        ))),
    }
}

/// Resolve a registry argument: a shipped name, or a path to a JSON catalog
pub fn registry_from_arg(arg: &str) -> Result<Arc<CategoryRegistry>> {
    if let Ok(registry) = registry_from_name(arg) {
        return Ok(Arc::new(registry.clone()));
    }
    let path = Path::new(arg);
    if path.extension().is_some_and(|ext| ext == "json") {
        return CategoryRegistry::from_json_file(path).map(Arc::new);
    }
    Err(PrevalenceError::InvalidRegistry(format!(
        "'{arg}' is neither a known registry nor a JSON catalog"
    )))
}
