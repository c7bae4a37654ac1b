//! Console output utilities
//!
//! This module provides utilities for formatted console output of reports.

use crate::models::{PrevalenceReport, UtilizationReport};

/// Print a prevalence report as a ranked table
pub fn print_prevalence_report(report: &PrevalenceReport) {
    println!(
        "Prevalence over {} ({} patients)",
        report.window, report.baseline.total_patients
    );
    println!(
        "{:<4} {:<16} {:<48} {:>9} {:>9} {:>8} {:>11}",
        "Rank", "Category", "Name", "Codes", "Patients", "%", "Per 100k"
    );
    for (rank, record) in report.records.iter().enumerate() {
        println!(
            "{:<4} {:<16} {:<48} {:>9} {:>9} {:>8.2} {:>11.2}",
            rank + 1,
            record.category_id,
            truncate(&record.display_name, 48),
            format!("{}-{}", record.code_start, record.code_end),
            record.patient_count,
            record.prevalence_pct,
            record.prevalence_per_100k
        );
    }
    print_missing(report.missing.iter().map(|m| (&m.category_id, &m.reason)));
}

/// Print a utilization report as a ranked table
pub fn print_utilization_report(report: &UtilizationReport) {
    println!(
        "Utilization over {} ({} prescriptions, {} patients)",
        report.window,
        report.baseline.total_events.unwrap_or_default(),
        report.baseline.total_patients
    );
    println!(
        "{:<4} {:<8} {:<48} {:>12} {:>8} {:>11}",
        "Rank", "Class", "Name", "Events", "%", "Per 100k"
    );
    for (rank, record) in report.records.iter().enumerate() {
        println!(
            "{:<4} {:<8} {:<48} {:>12} {:>8.2} {:>11.2}",
            rank + 1,
            record.category_id,
            truncate(&record.display_name, 48),
            record.prescription_count,
            record.percentage_of_total,
            record.rate_per_100k
        );
    }
    print_missing(report.missing.iter().map(|m| (&m.category_id, &m.reason)));
}

fn print_missing<'a>(missing: impl Iterator<Item = (&'a String, &'a String)>) {
    let mut missing = missing.peekable();
    if missing.peek().is_none() {
        return;
    }
    println!("Missing categories:");
    for (id, reason) in missing {
        println!("  - {id}: {reason}");
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(width.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}
