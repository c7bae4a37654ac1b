//! Counting of in-window events

use super::query::QueryPolicy;
use crate::error::StoreResult;
use crate::models::{Baseline, ConceptSet, TimeWindow};
use crate::store::{CountingUnit, EventStore, Measure};

/// Counts persons or event records tagged with a concept set
#[derive(Debug)]
pub struct OccurrenceCounter<'s, E: EventStore + ?Sized> {
    store: &'s E,
    policy: QueryPolicy,
}

impl<'s, E: EventStore + ?Sized> OccurrenceCounter<'s, E> {
    #[must_use]
    pub const fn new(store: &'s E, policy: QueryPolicy) -> Self {
        Self { store, policy }
    }

    /// Count matches of `concept_ids` inside `window`
    ///
    /// An empty concept set counts as zero without querying the store.
    pub async fn count(
        &self,
        concept_ids: &ConceptSet,
        window: &TimeWindow,
        measure: Measure,
    ) -> StoreResult<u64> {
        if concept_ids.is_empty() {
            return Ok(0);
        }

        let store = self.store;
        match measure.unit {
            CountingUnit::DistinctPersons => {
                self.policy
                    .run(|| store.count_distinct_persons(concept_ids, window, measure.domain))
                    .await
            }
            CountingUnit::EventRecords => {
                self.policy
                    .run(|| store.count_events(concept_ids, window, measure.domain))
                    .await
            }
        }
    }

    /// Denominators for `measure`
    ///
    /// Event-record measures also need every in-window event of the domain.
    pub async fn baseline(&self, window: &TimeWindow, measure: Measure) -> StoreResult<Baseline> {
        let store = self.store;
        let total_patients = self
            .policy
            .run(|| store.count_total_population())
            .await?;

        let total_events = match measure.unit {
            CountingUnit::DistinctPersons => None,
            CountingUnit::EventRecords => Some(
                self.policy
                    .run(|| store.count_total_events(window, measure.domain))
                    .await?,
            ),
        };

        Ok(Baseline {
            total_patients,
            total_events,
        })
    }
}
