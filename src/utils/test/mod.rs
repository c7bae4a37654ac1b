//! Test utilities
//!
//! Fixtures with a small clinical snapshot and a scripted store for driving
//! the pipeline with exact counts and injected failures.


// Re-export commonly used functions for convenience
pub use fixtures::{condition_registry, date, drug_registry, sample_snapshot, sample_store};
pub use helpers::ScriptedStore;
