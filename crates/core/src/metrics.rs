//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Directory enumeration (files seen, unreadable entries)
//! - Matching (resolved, ambiguous and unmatched targets)
//! - Planning (actions per group, synthesized merge rules, scan duration)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Enumeration
// =============================================================================

/// Files recorded in directory snapshots.
pub static FILES_ENUMERATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reconcile_files_enumerated_total",
        "Total files recorded in directory snapshots",
    )
    .unwrap()
});

/// Entries that could not be read during enumeration.
pub static ENUMERATION_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reconcile_enumeration_errors_total",
        "Total unreadable entries skipped during enumeration",
    )
    .unwrap()
});

// =============================================================================
// Matching
// =============================================================================

/// Match targets by outcome.
pub static MATCH_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reconcile_match_outcomes_total", "Match targets by outcome"),
        &["outcome"], // "resolved", "ambiguous", "unmatched"
    )
    .unwrap()
});

/// Merge rules synthesized from multi-episode files.
pub static AUTO_MERGES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "reconcile_auto_merges_total",
        "Total merge rules synthesized from multi-episode files",
    )
    .unwrap()
});

// =============================================================================
// Planning
// =============================================================================

/// Planned actions by group.
pub static PLANNED_ACTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("reconcile_planned_actions_total", "Planned actions by group"),
        &["group"],
    )
    .unwrap()
});

/// Wall time of a full scan in seconds.
pub static SCAN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("reconcile_scan_duration_seconds", "Duration of a full scan")
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]),
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Enumeration
        Box::new(FILES_ENUMERATED.clone()),
        Box::new(ENUMERATION_ERRORS.clone()),
        // Matching
        Box::new(MATCH_OUTCOMES.clone()),
        Box::new(AUTO_MERGES.clone()),
        // Planning
        Box::new(PLANNED_ACTIONS.clone()),
        Box::new(SCAN_DURATION.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        MATCH_OUTCOMES.with_label_values(&["resolved"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.contains(&"reconcile_match_outcomes_total".to_string()));
    }
}
