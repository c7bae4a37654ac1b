use std::time::Duration;

use cdm_prevalence::utils::test::condition_registry;
use cdm_prevalence::{AnalysisConfig, BatchOrchestrator, PrevalenceError, StoreError};

use crate::utils::{condition_store, skipping_config};

/// Test that the default policy aborts on the first failing category
#[tokio::test]
async fn test_abort_on_first_error() {
    let store = condition_store().failing_on("I00");
    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let result = orchestrator
        .prevalence_report::<&str>(&condition_registry(), None)
        .await;

    match result {
        Err(PrevalenceError::Category {
            category_id,
            source: StoreError::Query(_),
        }) => assert_eq!(category_id, "circulatory"),
        other => panic!("expected a circulatory query failure, got {other:?}"),
    }
}

/// Test that the skip policy lists failed categories apart from zero counts
#[tokio::test]
async fn test_skip_and_continue() {
    let store = condition_store().failing_on("I00");
    let orchestrator = BatchOrchestrator::new(&store, skipping_config());
    let report = orchestrator
        .prevalence_report::<&str>(&condition_registry(), None)
        .await
        .unwrap();

    assert_eq!(report.len(), 3);
    assert!(!report.is_complete());
    assert!(report.is_missing("circulatory"));
    assert!(report.get("circulatory").is_none());
    assert!(report.missing[0].reason.contains("circulatory"));

    let digestive = report.get("digestive").unwrap();
    assert_eq!(digestive.patient_count, 0);
    assert!(!report.is_missing("digestive"));
    assert_eq!(report.get("respiratory").unwrap().prevalence_pct, 4.00);
}

/// Test that a baseline failure aborts whatever the policy
#[tokio::test]
async fn test_baseline_failure() {
    let store = condition_store().with_failing_baseline();
    let orchestrator = BatchOrchestrator::new(&store, skipping_config());
    let result = orchestrator
        .prevalence_report::<&str>(&condition_registry(), None)
        .await;

    assert!(matches!(
        result,
        Err(PrevalenceError::Baseline(StoreError::ConnectionClosed(_)))
    ));
}

/// Test that a stalled query fails its category after the deadline
#[tokio::test]
async fn test_query_timeout() {
    let store = condition_store().stalled_on("K00");
    let config = skipping_config().with_query_timeout(Duration::from_millis(500));
    let orchestrator = BatchOrchestrator::new(&store, config);
    let report = orchestrator
        .prevalence_report::<&str>(&condition_registry(), None)
        .await
        .unwrap();

    assert_eq!(report.len(), 3);
    assert!(report.is_missing("digestive"));
    assert!(report.missing[0].reason.contains("timed out"));

    let aborting = BatchOrchestrator::new(
        &store,
        AnalysisConfig::default().with_query_timeout(Duration::from_millis(500)),
    );
    let result = aborting
        .prevalence_report(&condition_registry(), Some(&["digestive"][..]))
        .await;
    assert!(matches!(
        result,
        Err(PrevalenceError::Category {
            source: StoreError::Timeout(deadline),
            ..
        }) if deadline == Duration::from_millis(500)
    ));
}

/// Test that transient errors are retried up to the configured budget
#[tokio::test]
async fn test_transient_errors_retried() {
    let store = condition_store().flaky_on("J00", 2);
    let config = AnalysisConfig::default().with_max_retries(2);
    let report = BatchOrchestrator::new(&store, config)
        .prevalence_report(&condition_registry(), Some(&["respiratory"][..]))
        .await
        .unwrap();
    assert_eq!(report.get("respiratory").unwrap().patient_count, 480);

    let store = condition_store().flaky_on("J00", 2);
    let config = AnalysisConfig::default().with_max_retries(1);
    let result = BatchOrchestrator::new(&store, config)
        .prevalence_report(&condition_registry(), Some(&["respiratory"][..]))
        .await;
    assert!(matches!(
        result,
        Err(PrevalenceError::Category {
            source: StoreError::ConnectionClosed(_),
            ..
        })
    ));
}

/// Test that no retries happen by default
#[tokio::test]
async fn test_no_retries_by_default() {
    let store = condition_store().flaky_on("J00", 1);
    let report = BatchOrchestrator::new(&store, skipping_config())
        .prevalence_report(&condition_registry(), Some(&["respiratory"][..]))
        .await
        .unwrap();
    assert!(report.is_missing("respiratory"));
    // baseline and one resolution attempt
    assert_eq!(store.queries(), 2);
}
