//! Resolution of category predicates to standardized concepts

use log::debug;

use super::query::QueryPolicy;
use crate::error::StoreResult;
use crate::models::{Category, ConceptSet, Predicate};
use crate::registry::{CategoryRegistry, ResolutionStrategy};
use crate::store::VocabularyStore;

/// Turns a category's code predicate into the concept set it covers
///
/// The predicate picks the source lookup and the registry's strategy decides
/// whether the mapped targets are widened with their descendants.
#[derive(Debug)]
pub struct VocabularyResolver<'s, V: VocabularyStore + ?Sized> {
    store: &'s V,
    policy: QueryPolicy,
}

impl<'s, V: VocabularyStore + ?Sized> VocabularyResolver<'s, V> {
    #[must_use]
    pub const fn new(store: &'s V, policy: QueryPolicy) -> Self {
        Self { store, policy }
    }

    /// Resolve a category of `registry`
    ///
    /// No matching source codes is not an error: the result is an empty set,
    /// and expansion is skipped for it.
    pub async fn resolve(
        &self,
        registry: &CategoryRegistry,
        category: &Category,
    ) -> StoreResult<ConceptSet> {
        let vocabulary = registry.source_vocabulary();
        let store = self.store;

        let mapped = match &category.code_predicate {
            Predicate::Range { low, high } => {
                self.policy
                    .run(|| store.resolve_direct(vocabulary, low, high))
                    .await?
            }
            Predicate::Prefix { prefix } => {
                self.policy
                    .run(|| store.resolve_prefix_mapped(vocabulary, prefix))
                    .await?
            }
            Predicate::ExactSet { codes } => {
                self.policy
                    .run(|| store.resolve_codes(vocabulary, codes.as_slice()))
                    .await?
            }
        };

        if registry.strategy() == ResolutionStrategy::Direct || mapped.is_empty() {
            debug!(
                "Category '{}' ({}) maps to {} concepts",
                category.id,
                category.code_predicate,
                mapped.len()
            );
            return Ok(mapped);
        }

        let descendants = self
            .policy
            .run(|| store.expand_descendants(&mapped))
            .await?;
        let expanded = mapped.union(descendants);
        debug!(
            "Category '{}' ({}) expands to {} concepts",
            category.id,
            category.code_predicate,
            expanded.len()
        );
        Ok(expanded)
    }
}
