//! Domain models for prevalence runs
//!
//! This module contains the value types flowing through the pipeline:
//! categories and their code predicates, resolved concept sets, analysis
//! windows, per-category records and the final ranked report.

pub mod category;
pub mod concept;
pub mod record;
pub mod report;
pub mod window;

// Re-export commonly used types
pub use category::{Category, Predicate};
pub use concept::{ConceptId, ConceptSet};
pub use record::{Baseline, CountResult, RateRecord, Ranked, UtilizationRecord};
pub use report::{CategoryFailure, PrevalenceReport, Report, UtilizationReport};
pub use window::TimeWindow;
