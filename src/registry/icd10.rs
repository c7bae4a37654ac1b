//! ICD-10-CM chapter catalog
//!
//! Chapters are code ranges compared as strings. Source codes carry dots
//! (`J45.909`), so a range ending at `J99` covers `J45.909` but not `J99.1`.

use std::sync::LazyLock;

use super::{CategoryRegistry, ResolutionStrategy};
use crate::models::{Category, Predicate};
use crate::store::EventDomain;

/// Vocabulary id of ICD-10-CM source concepts
pub const VOCABULARY: &str = "ICD10CM";

/// (id, display name, low, high)
const CHAPTERS: &[(&str, &str, &str, &str)] = &[
    ("infectious", "Certain infectious and parasitic diseases", "A00", "B99"),
    ("neoplasms", "Neoplasms", "C00", "D49"),
    ("blood", "Diseases of the blood and immune mechanism", "D50", "D89"),
    ("endocrine", "Endocrine, nutritional and metabolic diseases", "E00", "E89"),
    ("mental", "Mental, behavioral and neurodevelopmental disorders", "F01", "F99"),
    ("nervous", "Diseases of the nervous system", "G00", "G99"),
    ("eye", "Diseases of the eye and adnexa", "H00", "H59"),
    ("ear", "Diseases of the ear and mastoid process", "H60", "H95"),
    ("circulatory", "Diseases of the circulatory system", "I00", "I99"),
    ("respiratory", "Diseases of the respiratory system", "J00", "J99"),
    ("digestive", "Diseases of the digestive system", "K00", "K95"),
    ("skin", "Diseases of the skin and subcutaneous tissue", "L00", "L99"),
    ("musculoskeletal", "Diseases of the musculoskeletal system", "M00", "M99"),
    ("genitourinary", "Diseases of the genitourinary system", "N00", "N99"),
    ("pregnancy", "Pregnancy, childbirth and the puerperium", "O00", "O9A"),
    ("perinatal", "Conditions originating in the perinatal period", "P00", "P96"),
    ("congenital", "Congenital malformations and chromosomal abnormalities", "Q00", "Q99"),
    ("symptoms", "Symptoms, signs and abnormal findings", "R00", "R99"),
    ("injury", "Injury, poisoning and external cause consequences", "S00", "T88"),
    ("special", "Codes for special purposes", "U00", "U85"),
    ("external", "External causes of morbidity", "V00", "Y99"),
    ("health_status", "Factors influencing health status", "Z00", "Z99"),
];

static REGISTRY: LazyLock<CategoryRegistry> = LazyLock::new(|| {
    let categories = CHAPTERS
        .iter()
        .map(|&(id, name, low, high)| Category::new(id, name, Predicate::range(low, high)))
        .collect();
    CategoryRegistry::from_trusted(
        "icd10_chapters",
        VOCABULARY,
        ResolutionStrategy::Direct,
        EventDomain::Condition,
        categories,
    )
});

/// ICD-10-CM chapters, loaded on first use
#[must_use]
pub fn chapters() -> &'static CategoryRegistry {
    &REGISTRY
}
