//! Standardized concept sets

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Identifier of a standardized concept
pub type ConceptId = i64;

/// Deduplicated set of standardized concept ids for one category
///
/// Produced per query by the resolver and never persisted, since the
/// vocabulary can change between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptSet(BTreeSet<ConceptId>);

impl ConceptSet {
    /// Create an empty concept set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of concepts
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the set contains a concept
    #[must_use]
    pub fn contains(&self, id: ConceptId) -> bool {
        self.0.contains(&id)
    }

    /// Add a concept
    pub fn insert(&mut self, id: ConceptId) -> bool {
        self.0.insert(id)
    }

    /// Iterate concept ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = ConceptId> + '_ {
        self.0.iter().copied()
    }

    /// Union with another set
    #[must_use]
    pub fn union(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Concept ids as a vector, ascending
    #[must_use]
    pub fn to_vec(&self) -> Vec<ConceptId> {
        self.iter().collect()
    }
}

impl FromIterator<ConceptId> for ConceptSet {
    fn from_iter<T: IntoIterator<Item = ConceptId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ConceptId> for ConceptSet {
    fn extend<T: IntoIterator<Item = ConceptId>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

impl IntoIterator for ConceptSet {
    type Item = ConceptId;
    type IntoIter = std::collections::btree_set::IntoIter<ConceptId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
