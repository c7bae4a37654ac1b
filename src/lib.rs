//! Prevalence and utilization rates for clinical classification categories
//! over a standardized clinical data repository, with concept resolution
//! through the vocabulary's mapping and hierarchy tables.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod store;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{AnalysisConfig, FailurePolicy};
pub use error::{PrevalenceError, Result, StoreError, StoreResult};
pub use models::{
    Category, CategoryFailure, ConceptId, ConceptSet, Predicate, PrevalenceReport, RateRecord,
    Report, TimeWindow, UtilizationRecord, UtilizationReport,
};

// Registries
pub use registry::{CategoryRegistry, ResolutionStrategy};
pub use registry::{available_registries, registry_from_arg, registry_from_name};

// Computation
pub use algorithm::{BatchOrchestrator, OccurrenceCounter, QueryPolicy, VocabularyResolver};

// Stores
pub use store::{
    CdmSnapshot, EventDomain, EventStore, InMemoryStore, Measure, VocabularyStore,
};
pub use store::parquet_io::{load_snapshot, load_snapshot_async};
