//! Logging utilities
//!
//! This module provides standardized logging functions for operations and
//! report runs.

use std::path::Path;
use std::time::Duration;

use crate::models::TimeWindow;

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file or directory being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{} {}", operation, path.display());
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `path` - Path of the file or directory that was operated on
/// * `items` - Number of items processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    items: usize,
    elapsed: Option<Duration>,
) {
    if let Some(duration) = elapsed {
        log::info!(
            "Successfully {} {} items from {} in {:?}",
            operation,
            items,
            path.display(),
            duration
        );
    } else {
        log::info!(
            "Successfully {} {} items from {}",
            operation,
            items,
            path.display()
        );
    }
}

/// Log an operation warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `path` - Optional path related to the warning
pub fn log_warning(message: &str, path: Option<&Path>) {
    if let Some(path) = path {
        log::warn!("{}: {}", message, path.display());
    } else {
        log::warn!("{message}");
    }
}

/// Log the start of a report run
pub fn log_run_start(registry: &str, categories: usize, window: &TimeWindow) {
    log::info!("Computing {categories} categories of {registry} over {window}");
}

/// Log a category left out of the report under the skip policy
pub fn log_category_skipped(category_id: &str, reason: &dyn std::fmt::Display) {
    log::warn!("Skipping category '{category_id}': {reason}");
}

/// Log the completion of a report run
///
/// # Arguments
/// * `registry` - Name of the registry the report covers
/// * `records` - Number of records produced
/// * `missing` - Number of categories skipped after a failure
/// * `elapsed` - Wall time of the run
pub fn log_run_complete(registry: &str, records: usize, missing: usize, elapsed: Duration) {
    if missing == 0 {
        log::info!("Computed {records} categories of {registry} in {elapsed:?}");
    } else {
        log::warn!(
            "Computed {records} categories of {registry} in {elapsed:?}, {missing} skipped after errors"
        );
    }
}
