//! Category registries
//!
//! A registry is a read-only catalog of classification categories from one
//! source coding system. It also fixes how its categories are resolved and
//! which event table they are counted in, since both follow from the domain:
//! diagnosis chapters map directly onto condition concepts, while drug classes
//! are mapped and then expanded to the finer-grained drug products that
//! exposures are recorded with.
//!
//! Shipped catalogs:
//! - ICD-10-CM chapters (`Range` predicates, condition occurrences)
//! - ATC anatomical main groups (`Prefix` predicates, drug exposures)

pub mod atc;
pub mod factory;
pub mod icd10;

use std::fmt;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{PrevalenceError, Result};
use crate::models::Category;
use crate::store::EventDomain;

pub use factory::{available_registries, registry_from_arg, registry_from_name};

/// How a category predicate becomes a concept set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    /// Follow `Maps to` edges only
    Direct,
    /// Follow `Maps to` edges, then add every descendant of the targets
    MappedExpanded,
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct mapping"),
            Self::MappedExpanded => write!(f, "mapped + hierarchy expansion"),
        }
    }
}

/// Serialized form of a registry, as found in catalog files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryDefinition {
    pub name: String,
    pub source_vocabulary: String,
    pub strategy: ResolutionStrategy,
    pub domain: EventDomain,
    pub categories: Vec<Category>,
}

/// Read-only catalog of categories
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    name: String,
    source_vocabulary: String,
    strategy: ResolutionStrategy,
    domain: EventDomain,
    categories: Vec<Category>,
    index: FxHashMap<String, usize>,
}

impl CategoryRegistry {
    /// Build a registry, rejecting duplicate ids and empty predicates
    pub fn new(definition: RegistryDefinition) -> Result<Self> {
        if definition.categories.is_empty() {
            return Err(PrevalenceError::InvalidRegistry(format!(
                "registry '{}' has no categories",
                definition.name
            )));
        }

        let mut index = FxHashMap::default();
        for (position, category) in definition.categories.iter().enumerate() {
            category.code_predicate.check().map_err(|reason| {
                PrevalenceError::InvalidRegistry(format!(
                    "category '{}' in '{}': {reason}",
                    category.id, definition.name
                ))
            })?;
            if index.insert(category.id.clone(), position).is_some() {
                return Err(PrevalenceError::InvalidRegistry(format!(
                    "duplicate category id '{}' in '{}'",
                    category.id, definition.name
                )));
            }
        }

        Ok(Self {
            name: definition.name,
            source_vocabulary: definition.source_vocabulary,
            strategy: definition.strategy,
            domain: definition.domain,
            categories: definition.categories,
            index,
        })
    }

    /// Build a registry from a shipped catalog without validation
    pub(crate) fn from_trusted(
        name: &str,
        source_vocabulary: &str,
        strategy: ResolutionStrategy,
        domain: EventDomain,
        categories: Vec<Category>,
    ) -> Self {
        let index = categories
            .iter()
            .enumerate()
            .map(|(position, category)| (category.id.clone(), position))
            .collect();
        Self {
            name: name.to_string(),
            source_vocabulary: source_vocabulary.to_string(),
            strategy,
            domain,
            categories,
            index,
        }
    }

    /// Load a registry from a JSON catalog file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let definition: RegistryDefinition = serde_json::from_str(&content)?;
        Self::new(definition)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Vocabulary id of the source codes in the predicates
    #[must_use]
    pub fn source_vocabulary(&self) -> &str {
        &self.source_vocabulary
    }

    #[must_use]
    pub const fn strategy(&self) -> ResolutionStrategy {
        self.strategy
    }

    /// Event table the categories are counted in
    #[must_use]
    pub const fn domain(&self) -> EventDomain {
        self.domain
    }

    /// All categories in registration order
    #[must_use]
    pub fn list_categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by id
    pub fn get(&self, id: &str) -> Result<&Category> {
        self.index
            .get(id)
            .map(|&position| &self.categories[position])
            .ok_or_else(|| PrevalenceError::UnknownCategory(id.to_string()))
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Resolve a requested subset of ids, or every category when `None`
    ///
    /// Fails on the first unknown id. Duplicate requests are collapsed while
    /// keeping the first occurrence's position.
    pub fn select<S: AsRef<str>>(&self, ids: Option<&[S]>) -> Result<Vec<&Category>> {
        let Some(ids) = ids else {
            return Ok(self.categories.iter().collect());
        };

        ids.iter()
            .map(|id| self.get(id.as_ref()))
            .process_results(|categories| categories.unique_by(|c| c.id.clone()).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl fmt::Display for CategoryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} categories, {}, {}, {})",
            self.name,
            self.categories.len(),
            self.source_vocabulary,
            self.strategy,
            self.domain
        )
    }
}
