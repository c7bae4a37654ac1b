//! In-memory snapshot of the vocabulary and clinical event tables
//!
//! Row types follow the standardized data model column names, so a snapshot
//! can be loaded from JSON exports or Parquet extracts of the same tables.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::models::ConceptId;

/// Relationship id linking a source concept to its standard equivalent
pub const MAPS_TO: &str = "Maps to";

/// Row of the `concept` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub concept_id: ConceptId,
    pub concept_code: String,
    pub vocabulary_id: String,
    #[serde(default)]
    pub concept_name: String,
    /// Set when the concept has been deprecated or replaced
    #[serde(default)]
    pub invalid_reason: Option<String>,
}

impl Concept {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.invalid_reason.is_none()
    }
}

/// Row of the `concept_relationship` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRelationship {
    pub concept_id_1: ConceptId,
    pub concept_id_2: ConceptId,
    pub relationship_id: String,
    #[serde(default)]
    pub invalid_reason: Option<String>,
}

impl ConceptRelationship {
    /// Whether the row is a valid `Maps to` edge
    #[must_use]
    pub fn is_valid_mapping(&self) -> bool {
        self.invalid_reason.is_none() && self.relationship_id == MAPS_TO
    }
}

/// Row of the `concept_ancestor` transitive closure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptAncestor {
    pub ancestor_concept_id: ConceptId,
    pub descendant_concept_id: ConceptId,
}

/// Row of the `person` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub person_id: i64,
}

/// Row of an event table (`condition_occurrence` or `drug_exposure`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalEvent {
    pub person_id: i64,
    #[serde(alias = "condition_concept_id", alias = "drug_concept_id")]
    pub concept_id: ConceptId,
    #[serde(
        alias = "condition_start_date",
        alias = "drug_exposure_start_date"
    )]
    pub start_date: NaiveDate,
    #[serde(
        default,
        alias = "condition_end_date",
        alias = "drug_exposure_end_date"
    )]
    pub end_date: Option<NaiveDate>,
}

/// All tables needed to resolve and count categories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdmSnapshot {
    #[serde(default)]
    pub concepts: Vec<Concept>,
    #[serde(default)]
    pub relationships: Vec<ConceptRelationship>,
    #[serde(default)]
    pub ancestors: Vec<ConceptAncestor>,
    #[serde(default)]
    pub persons: Vec<Person>,
    #[serde(default)]
    pub condition_occurrences: Vec<ClinicalEvent>,
    #[serde(default)]
    pub drug_exposures: Vec<ClinicalEvent>,
}

impl CdmSnapshot {
    /// Load a snapshot from a JSON file
    pub fn from_json_file(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse a snapshot from JSON text
    pub fn from_json_str(content: &str) -> StoreResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Total rows across all tables
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.concepts.len()
            + self.relationships.len()
            + self.ancestors.len()
            + self.persons.len()
            + self.condition_occurrences.len()
            + self.drug_exposures.len()
    }
}
