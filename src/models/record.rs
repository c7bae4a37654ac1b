//! Count and rate records
//!
//! Records are derived values: created once by the aggregator and never
//! mutated afterwards.

use serde::{Deserialize, Serialize};

use super::window::TimeWindow;

/// Count produced by the occurrence counter for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResult {
    pub category_id: String,
    pub count: u64,
}

impl CountResult {
    #[must_use]
    pub fn new(category_id: impl Into<String>, count: u64) -> Self {
        Self {
            category_id: category_id.into(),
            count,
        }
    }
}

/// Denominators computed once per run and shared by every category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    /// Distinct persons in the population table
    pub total_patients: u64,
    /// All in-window events of the counted domain, for event-record measures
    pub total_events: Option<u64>,
}

/// Records that can be ranked in a report
pub trait Ranked {
    /// Category the record belongs to
    fn category_id(&self) -> &str;

    /// Value the report is sorted by, descending
    fn rank_value(&self) -> f64;
}

/// Prevalence of one category among distinct persons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateRecord {
    pub category_id: String,
    pub display_name: String,
    pub code_start: String,
    pub code_end: String,
    /// Distinct persons with an in-window event of the category
    pub patient_count: u64,
    /// Baseline population
    pub total_patients: u64,
    pub prevalence_pct: f64,
    pub prevalence_per_100k: f64,
    pub date_range: TimeWindow,
}

impl Ranked for RateRecord {
    fn category_id(&self) -> &str {
        &self.category_id
    }

    fn rank_value(&self) -> f64 {
        self.prevalence_pct
    }
}

/// Utilization of one category measured in event records (prescriptions)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationRecord {
    pub category_id: String,
    pub display_name: String,
    pub code_start: String,
    pub code_end: String,
    /// In-window events of the category
    pub prescription_count: u64,
    /// In-window events of the whole domain
    pub total_prescriptions: u64,
    /// Baseline population
    pub total_patients: u64,
    /// Share of all in-window events, in percent
    pub percentage_of_total: f64,
    /// Events per 100,000 persons
    pub rate_per_100k: f64,
    pub date_range: TimeWindow,
}

impl Ranked for UtilizationRecord {
    fn category_id(&self) -> &str {
        &self.category_id
    }

    fn rank_value(&self) -> f64 {
        self.percentage_of_total
    }
}
