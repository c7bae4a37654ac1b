//! In-memory vocabulary and event store
//!
//! Indexes a [`CdmSnapshot`] once at construction. Source concepts are kept
//! sorted by code per vocabulary so range and prefix lookups are binary
//! searches. Event scans run on rayon.

use log::debug;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use super::snapshot::{CdmSnapshot, ClinicalEvent};
use super::{EventDomain, EventStore, StoreFuture, VocabularyStore};
use crate::models::{ConceptId, ConceptSet, TimeWindow};

/// Reference store answering every query from an in-memory snapshot
#[derive(Debug)]
pub struct InMemoryStore {
    /// Valid source concepts per vocabulary as (code, id), sorted by code
    codes_by_vocabulary: FxHashMap<String, Vec<(String, ConceptId)>>,
    /// Valid `Maps to` targets per source concept, restricted to valid targets
    mappings: FxHashMap<ConceptId, Vec<ConceptId>>,
    /// Descendants per ancestor from the closure table
    descendants: FxHashMap<ConceptId, Vec<ConceptId>>,
    /// Person ids of the person table; events of other ids are not persons
    persons: FxHashSet<i64>,
    condition_occurrences: Vec<ClinicalEvent>,
    drug_exposures: Vec<ClinicalEvent>,
}

impl InMemoryStore {
    /// Index a snapshot
    #[must_use]
    pub fn new(snapshot: CdmSnapshot) -> Self {
        let valid_concepts: FxHashSet<ConceptId> = snapshot
            .concepts
            .iter()
            .filter(|c| c.is_valid())
            .map(|c| c.concept_id)
            .collect();

        let mut codes_by_vocabulary: FxHashMap<String, Vec<(String, ConceptId)>> =
            FxHashMap::default();
        for concept in snapshot.concepts.iter().filter(|c| c.is_valid()) {
            codes_by_vocabulary
                .entry(concept.vocabulary_id.clone())
                .or_default()
                .push((concept.concept_code.clone(), concept.concept_id));
        }
        for codes in codes_by_vocabulary.values_mut() {
            codes.sort();
        }

        let mut mappings: FxHashMap<ConceptId, Vec<ConceptId>> = FxHashMap::default();
        for rel in snapshot
            .relationships
            .iter()
            .filter(|r| r.is_valid_mapping() && valid_concepts.contains(&r.concept_id_2))
        {
            mappings
                .entry(rel.concept_id_1)
                .or_default()
                .push(rel.concept_id_2);
        }

        let mut descendants: FxHashMap<ConceptId, Vec<ConceptId>> = FxHashMap::default();
        for row in &snapshot.ancestors {
            descendants
                .entry(row.ancestor_concept_id)
                .or_default()
                .push(row.descendant_concept_id);
        }

        let persons: FxHashSet<i64> = snapshot.persons.iter().map(|p| p.person_id).collect();

        debug!(
            "Indexed snapshot: {} vocabularies, {} mapped source concepts, {} persons",
            codes_by_vocabulary.len(),
            mappings.len(),
            persons.len()
        );

        Self {
            codes_by_vocabulary,
            mappings,
            descendants,
            persons,
            condition_occurrences: snapshot.condition_occurrences,
            drug_exposures: snapshot.drug_exposures,
        }
    }

    fn source_codes(&self, vocabulary: &str) -> &[(String, ConceptId)] {
        self.codes_by_vocabulary
            .get(vocabulary)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Map source concept ids to their standard targets
    fn map_to_standard<I>(&self, source_ids: I) -> ConceptSet
    where
        I: IntoIterator<Item = ConceptId>,
    {
        source_ids
            .into_iter()
            .filter_map(|id| self.mappings.get(&id))
            .flatten()
            .copied()
            .collect()
    }

    fn range_lookup(&self, vocabulary: &str, low: &str, high: &str) -> ConceptSet {
        let codes = self.source_codes(vocabulary);
        let from = codes.partition_point(|(code, _)| code.as_str() < low);
        let to = codes.partition_point(|(code, _)| code.as_str() <= high);
        if from >= to {
            return ConceptSet::new();
        }
        self.map_to_standard(codes[from..to].iter().map(|(_, id)| *id))
    }

    fn prefix_lookup(&self, vocabulary: &str, prefix: &str) -> ConceptSet {
        let codes = self.source_codes(vocabulary);
        let from = codes.partition_point(|(code, _)| code.as_str() < prefix);
        self.map_to_standard(
            codes[from..]
                .iter()
                .take_while(|(code, _)| code.starts_with(prefix))
                .map(|(_, id)| *id),
        )
    }

    fn exact_lookup(&self, vocabulary: &str, wanted: &[String]) -> ConceptSet {
        let codes = self.source_codes(vocabulary);
        let mut ids = Vec::new();
        for code in wanted {
            let from = codes.partition_point(|(c, _)| c < code);
            ids.extend(
                codes[from..]
                    .iter()
                    .take_while(|(c, _)| c == code)
                    .map(|(_, id)| *id),
            );
        }
        self.map_to_standard(ids)
    }

    fn events(&self, domain: EventDomain) -> &[ClinicalEvent] {
        match domain {
            EventDomain::Condition => &self.condition_occurrences,
            EventDomain::DrugExposure => &self.drug_exposures,
        }
    }

    fn matching_events<'a>(
        &'a self,
        concept_ids: &'a ConceptSet,
        window: &'a TimeWindow,
        domain: EventDomain,
    ) -> impl ParallelIterator<Item = &'a ClinicalEvent> + 'a {
        self.events(domain).par_iter().filter(move |e| {
            concept_ids.contains(e.concept_id) && window.contains_event(e.start_date, e.end_date)
        })
    }
}

impl VocabularyStore for InMemoryStore {
    fn resolve_direct<'a>(
        &'a self,
        source_vocabulary: &'a str,
        low: &'a str,
        high: &'a str,
    ) -> StoreFuture<'a, ConceptSet> {
        Box::pin(async move { Ok(self.range_lookup(source_vocabulary, low, high)) })
    }

    fn resolve_prefix_mapped<'a>(
        &'a self,
        source_vocabulary: &'a str,
        prefix: &'a str,
    ) -> StoreFuture<'a, ConceptSet> {
        Box::pin(async move { Ok(self.prefix_lookup(source_vocabulary, prefix)) })
    }

    fn resolve_codes<'a>(
        &'a self,
        source_vocabulary: &'a str,
        codes: &'a [String],
    ) -> StoreFuture<'a, ConceptSet> {
        Box::pin(async move { Ok(self.exact_lookup(source_vocabulary, codes)) })
    }

    fn expand_descendants<'a>(
        &'a self,
        concept_ids: &'a ConceptSet,
    ) -> StoreFuture<'a, ConceptSet> {
        Box::pin(async move {
            Ok(concept_ids
                .iter()
                .filter_map(|id| self.descendants.get(&id))
                .flatten()
                .copied()
                .collect())
        })
    }
}

impl EventStore for InMemoryStore {
    fn count_distinct_persons<'a>(
        &'a self,
        concept_ids: &'a ConceptSet,
        window: &'a TimeWindow,
        domain: EventDomain,
    ) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            let persons: FxHashSet<i64> = self
                .matching_events(concept_ids, window, domain)
                .map(|e| e.person_id)
                .filter(|id| self.persons.contains(id))
                .collect();
            Ok(persons.len() as u64)
        })
    }

    fn count_events<'a>(
        &'a self,
        concept_ids: &'a ConceptSet,
        window: &'a TimeWindow,
        domain: EventDomain,
    ) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            Ok(self.matching_events(concept_ids, window, domain).count() as u64)
        })
    }

    fn count_total_population(&self) -> StoreFuture<'_, u64> {
        Box::pin(async move { Ok(self.persons.len() as u64) })
    }

    fn count_total_events<'a>(
        &'a self,
        window: &'a TimeWindow,
        domain: EventDomain,
    ) -> StoreFuture<'a, u64> {
        Box::pin(async move {
            let count = self
                .events(domain)
                .par_iter()
                .filter(|e| window.contains_event(e.start_date, e.end_date))
                .count();
            Ok(count as u64)
        })
    }
}
