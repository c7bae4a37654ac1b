//! Logging utilities for output and progress tracking
//!
//! This module provides utilities for logging, console output, and progress tracking.

pub mod console;
pub mod log;
pub mod progress;

// Re-export commonly used functions for convenience
pub use self::log::{
    log_category_skipped, log_operation_complete, log_operation_start, log_run_complete,
    log_run_start, log_warning,
};
pub use console::{print_prevalence_report, print_utilization_report};
pub use progress::{create_category_progress_bar, finish_progress_bar};
