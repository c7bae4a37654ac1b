//! Rate computation
//!
//! Every rate is rounded to two decimals on its own, so a per-100k value is
//! not derived from the rounded percentage.

use crate::error::{PrevalenceError, Result};
use crate::models::{Baseline, Category, RateRecord, TimeWindow, UtilizationRecord};

/// Largest gap between `prevalence_per_100k` and `prevalence_pct * 1000`
///
/// The percentage is off by at most 0.005 after rounding, which scales to 5
/// per 100k. The rounded per-100k value never crosses that boundary.
pub const MAX_PER_100K_ROUNDING_GAP: f64 = 5.0;

/// Round half away from zero to two decimals
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[allow(clippy::cast_precision_loss)]
fn ratio(count: u64, total: u64, scale: f64) -> f64 {
    count as f64 / total as f64 * scale
}

/// Prevalence of a category among distinct persons
///
/// # Arguments
/// * `count` - Distinct persons with an in-window event of the category
/// * `baseline` - Population denominators of the run
/// * `category` - Category the count belongs to
/// * `window` - Window the count was taken over
pub fn prevalence(
    count: u64,
    baseline: &Baseline,
    category: &Category,
    window: &TimeWindow,
) -> Result<RateRecord> {
    let total = baseline.total_patients;
    if total == 0 {
        return Err(PrevalenceError::ZeroPopulation);
    }

    let (code_start, code_end) = category.code_predicate.bounds();
    Ok(RateRecord {
        category_id: category.id.clone(),
        display_name: category.display_name.clone(),
        code_start,
        code_end,
        patient_count: count,
        total_patients: total,
        prevalence_pct: round2(ratio(count, total, 100.0)),
        prevalence_per_100k: round2(ratio(count, total, 100_000.0)),
        date_range: *window,
    })
}

/// Share of all in-window events taken by a category, and its rate per 100k
/// persons
///
/// With no in-window events at all the share is 0.
pub fn utilization(
    count: u64,
    baseline: &Baseline,
    category: &Category,
    window: &TimeWindow,
) -> Result<UtilizationRecord> {
    let total_patients = baseline.total_patients;
    if total_patients == 0 {
        return Err(PrevalenceError::ZeroPopulation);
    }

    let total_events = baseline.total_events.unwrap_or_default();
    let percentage_of_total = if total_events == 0 {
        0.0
    } else {
        round2(ratio(count, total_events, 100.0))
    };

    let (code_start, code_end) = category.code_predicate.bounds();
    Ok(UtilizationRecord {
        category_id: category.id.clone(),
        display_name: category.display_name.clone(),
        code_start,
        code_end,
        prescription_count: count,
        total_prescriptions: total_events,
        total_patients,
        percentage_of_total,
        rate_per_100k: round2(ratio(count, total_patients, 100_000.0)),
        date_range: *window,
    })
}
