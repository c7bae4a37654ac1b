//! Progress reporting utilities for report runs
//!
//! This module provides standardized progress reporting
//! for per-category computation, using the indicatif crate.

use indicatif::{ProgressBar, ProgressStyle};

/// Default style for the category progress bar
pub const DEFAULT_CATEGORY_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// Create a progress bar over categories
///
/// Returns a hidden bar when `visible` is false, so callers can tick it
/// unconditionally.
#[must_use]
pub fn create_category_progress_bar(length: u64, description: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(length);
    if let Ok(style) = ProgressStyle::default_bar().template(DEFAULT_CATEGORY_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(description.to_string());
    pb
}

/// Finish a progress bar with a completion message
///
/// # Arguments
/// * `pb` - The `ProgressBar` to finish
/// * `message` - Optional completion message
pub fn finish_progress_bar(pb: &ProgressBar, message: Option<&str>) {
    if let Some(msg) = message {
        pb.finish_with_message(msg.to_string());
    } else {
        pb.finish();
    }
}
