//! Prevalence computation
//!
//! This module turns category predicates into concept sets, counts matching
//! events, and combines the counts with population baselines into ranked
//! reports.

pub mod aggregator;
pub mod counter;
pub mod orchestrator;
pub mod query;
pub mod resolver;

// Re-export commonly used items
pub use aggregator::{MAX_PER_100K_ROUNDING_GAP, prevalence, round2, utilization};
pub use counter::OccurrenceCounter;
pub use orchestrator::BatchOrchestrator;
pub use query::QueryPolicy;
pub use resolver::VocabularyResolver;
