//! ATC anatomical main group catalog
//!
//! Each group is a one-letter code prefix. Drug exposures are recorded at the
//! clinical drug level, below the ingredients ATC codes map to, so these
//! categories are resolved with hierarchy expansion.

use std::sync::LazyLock;

use super::{CategoryRegistry, ResolutionStrategy};
use crate::models::{Category, Predicate};
use crate::store::EventDomain;

/// Vocabulary id of ATC source concepts
pub const VOCABULARY: &str = "ATC";

const MAIN_GROUPS: &[(&str, &str)] = &[
    ("A", "Alimentary tract and metabolism"),
    ("B", "Blood and blood forming organs"),
    ("C", "Cardiovascular system"),
    ("D", "Dermatologicals"),
    ("G", "Genito urinary system and sex hormones"),
    ("H", "Systemic hormonal preparations, excluding sex hormones and insulins"),
    ("J", "Antiinfectives for systemic use"),
    ("L", "Antineoplastic and immunomodulating agents"),
    ("M", "Musculo-skeletal system"),
    ("N", "Nervous system"),
    ("P", "Antiparasitic products, insecticides and repellents"),
    ("R", "Respiratory system"),
    ("S", "Sensory organs"),
    ("V", "Various"),
];

static REGISTRY: LazyLock<CategoryRegistry> = LazyLock::new(|| {
    let categories = MAIN_GROUPS
        .iter()
        .map(|&(code, name)| Category::new(code, name, Predicate::prefix(code)))
        .collect();
    CategoryRegistry::from_trusted(
        "atc_main_groups",
        VOCABULARY,
        ResolutionStrategy::MappedExpanded,
        EventDomain::DrugExposure,
        categories,
    )
});

/// ATC main groups, loaded on first use
#[must_use]
pub fn main_groups() -> &'static CategoryRegistry {
    &REGISTRY
}
