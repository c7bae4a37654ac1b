//! Ranked reports

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::record::{Baseline, RateRecord, Ranked, UtilizationRecord};
use super::window::TimeWindow;

/// A category left out of a report under the skip policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFailure {
    pub category_id: String,
    /// Rendered error that caused the omission
    pub reason: String,
}

/// Ranked report over the requested categories
///
/// A category is either present in `records` (possibly with a zero count) or
/// listed in `missing`, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report<R> {
    /// Records sorted by rate descending, ties by category id ascending
    pub records: Vec<R>,
    /// Categories that failed and were skipped
    pub missing: Vec<CategoryFailure>,
    pub window: TimeWindow,
    pub baseline: Baseline,
}

/// Report of distinct-person prevalence
pub type PrevalenceReport = Report<RateRecord>;

/// Report of event-record utilization
pub type UtilizationReport = Report<UtilizationRecord>;

impl<R: Ranked> Report<R> {
    /// Build a report, sorting the records
    #[must_use]
    pub fn new(
        mut records: Vec<R>,
        mut missing: Vec<CategoryFailure>,
        window: TimeWindow,
        baseline: Baseline,
    ) -> Self {
        rank(&mut records);
        missing.sort_by(|a, b| a.category_id.cmp(&b.category_id));
        Self {
            records,
            missing,
            window,
            baseline,
        }
    }

    /// Look up the record of a category
    #[must_use]
    pub fn get(&self, category_id: &str) -> Option<&R> {
        self.records.iter().find(|r| r.category_id() == category_id)
    }

    /// Whether the category was requested but skipped after a failure
    #[must_use]
    pub fn is_missing(&self, category_id: &str) -> bool {
        self.missing.iter().any(|m| m.category_id == category_id)
    }

    /// Whether every requested category produced a record
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sort records by rate descending, breaking ties by category id ascending
pub fn rank<R: Ranked>(records: &mut [R]) {
    records.sort_by(|a, b| {
        b.rank_value()
            .partial_cmp(&a.rank_value())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category_id().cmp(b.category_id()))
    });
}
