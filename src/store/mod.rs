//! Store interfaces consumed by the engine
//!
//! The engine never builds query strings. It talks to the vocabulary and the
//! event data through the structured operations below, so a database-backed
//! store binds parameters instead of interpolating codes. The in-memory store
//! over a [`CdmSnapshot`] is the reference implementation.

pub mod memory;
pub mod parquet_io;
pub mod snapshot;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::models::{ConceptSet, TimeWindow};

pub use memory::InMemoryStore;
pub use snapshot::CdmSnapshot;

/// Boxed future returned by store operations
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Kind of clinical event being counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventDomain {
    /// Condition occurrences (diagnoses)
    Condition,
    /// Drug exposures (prescriptions, dispensings)
    DrugExposure,
}

impl fmt::Display for EventDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condition => write!(f, "condition_occurrence"),
            Self::DrugExposure => write!(f, "drug_exposure"),
        }
    }
}

/// Unit a count is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountingUnit {
    /// Each person counts once regardless of how many events they have
    DistinctPersons,
    /// Every event record counts
    EventRecords,
}

/// What to count: a domain and a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Measure {
    pub domain: EventDomain,
    pub unit: CountingUnit,
}

impl Measure {
    #[must_use]
    pub const fn new(domain: EventDomain, unit: CountingUnit) -> Self {
        Self { domain, unit }
    }

    /// Distinct persons with a matching event in `domain`
    #[must_use]
    pub const fn persons(domain: EventDomain) -> Self {
        Self::new(domain, CountingUnit::DistinctPersons)
    }

    /// Matching event records in `domain`
    #[must_use]
    pub const fn events(domain: EventDomain) -> Self {
        Self::new(domain, CountingUnit::EventRecords)
    }
}

/// Source-to-standard concept resolution
pub trait VocabularyStore: Send + Sync {
    /// Standard concepts mapped from source codes in `[low, high]`
    ///
    /// Codes compare as strings. Only valid source concepts, valid `Maps to`
    /// relationships and valid target concepts take part.
    fn resolve_direct<'a>(
        &'a self,
        source_vocabulary: &'a str,
        low: &'a str,
        high: &'a str,
    ) -> StoreFuture<'a, ConceptSet>;

    /// Standard concepts mapped from source codes starting with `prefix`
    fn resolve_prefix_mapped<'a>(
        &'a self,
        source_vocabulary: &'a str,
        prefix: &'a str,
    ) -> StoreFuture<'a, ConceptSet>;

    /// Standard concepts mapped from the exact source codes given
    fn resolve_codes<'a>(
        &'a self,
        source_vocabulary: &'a str,
        codes: &'a [String],
    ) -> StoreFuture<'a, ConceptSet>;

    /// Every descendant of the given concepts in the ancestor closure
    fn expand_descendants<'a>(&'a self, concept_ids: &'a ConceptSet)
    -> StoreFuture<'a, ConceptSet>;
}

/// Event counting over the clinical data
pub trait EventStore: Send + Sync {
    /// Distinct persons with an in-window event tagged with one of the concepts
    fn count_distinct_persons<'a>(
        &'a self,
        concept_ids: &'a ConceptSet,
        window: &'a TimeWindow,
        domain: EventDomain,
    ) -> StoreFuture<'a, u64>;

    /// In-window event records tagged with one of the concepts
    fn count_events<'a>(
        &'a self,
        concept_ids: &'a ConceptSet,
        window: &'a TimeWindow,
        domain: EventDomain,
    ) -> StoreFuture<'a, u64>;

    /// Distinct persons in the population table
    fn count_total_population(&self) -> StoreFuture<'_, u64>;

    /// All in-window event records of the domain
    fn count_total_events<'a>(
        &'a self,
        window: &'a TimeWindow,
        domain: EventDomain,
    ) -> StoreFuture<'a, u64>;
}
