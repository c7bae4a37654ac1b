use cdm_prevalence::utils::test::{ScriptedStore, condition_registry, drug_registry};
use cdm_prevalence::algorithm::MAX_PER_100K_ROUNDING_GAP;
use cdm_prevalence::{AnalysisConfig, BatchOrchestrator, ConceptId, PrevalenceError, TimeWindow};

use crate::utils::{RESPIRATORY, condition_store};

/// Test the respiratory chapter: 480 of 12000 patients
#[tokio::test]
async fn test_respiratory_prevalence() {
    let store = condition_store();
    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let report = orchestrator
        .prevalence_report(&condition_registry(), Some(&["respiratory"][..]))
        .await
        .unwrap();

    assert_eq!(report.len(), 1);
    let record = &report.records[0];
    assert_eq!(record.category_id, "respiratory");
    assert_eq!(record.code_start, "J00");
    assert_eq!(record.code_end, "J99");
    assert_eq!(record.patient_count, 480);
    assert_eq!(record.total_patients, 12_000);
    assert_eq!(record.prevalence_pct, 4.00);
    assert_eq!(record.prevalence_per_100k, 4000.00);
    assert_eq!(record.date_range, TimeWindow::default());
}

/// Test the cardiovascular drug class: 10 mapped ingredients expanded to 50
/// concepts, 900 of 10000 prescriptions among 5000 patients
#[tokio::test]
async fn test_cardiovascular_utilization() {
    let roots: Vec<ConceptId> = (1..=10).collect();
    let descendants: Vec<ConceptId> = (11..=50).collect();
    let expanded: Vec<ConceptId> = (1..=50).collect();
    let store = ScriptedStore::new()
        .with_population(5_000)
        .with_total_events(10_000)
        .with_resolution("C", &roots)
        .with_descendants(1, &descendants)
        .with_count(&expanded, 900);

    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let report = orchestrator
        .utilization_report(&drug_registry(), Some(&["C"][..]))
        .await
        .unwrap();

    let record = report.get("C").unwrap();
    assert_eq!(record.prescription_count, 900);
    assert_eq!(record.total_prescriptions, 10_000);
    assert_eq!(record.total_patients, 5_000);
    assert_eq!(record.percentage_of_total, 9.00);
    assert_eq!(record.rate_per_100k, 18_000.00);
    assert_eq!(report.baseline.total_events, Some(10_000));
}

/// Test that every requested category is reported, unmapped ones with zero
#[tokio::test]
async fn test_all_categories_reported() {
    let store = condition_store();
    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let report = orchestrator
        .prevalence_report::<&str>(&condition_registry(), None)
        .await
        .unwrap();

    assert_eq!(report.len(), 4);
    assert!(report.is_complete());

    let digestive = report.get("digestive").unwrap();
    assert_eq!(digestive.patient_count, 0);
    assert_eq!(digestive.prevalence_pct, 0.0);

    for record in &report.records {
        assert_eq!(record.total_patients, 12_000);
        assert!(record.patient_count <= record.total_patients);
        let gap = (record.prevalence_per_100k - record.prevalence_pct * 1000.0).abs();
        assert!(gap <= MAX_PER_100K_ROUNDING_GAP + 1e-6);
    }
}

/// Test ranking by rate, ties broken by category id
#[tokio::test]
async fn test_ranking() {
    let store = condition_store()
        .with_resolution("K00", &[777])
        .with_count(&[777], 1_200);
    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let report = orchestrator
        .prevalence_report::<&str>(&condition_registry(), None)
        .await
        .unwrap();

    let order: Vec<_> = report
        .records
        .iter()
        .map(|r| r.category_id.as_str())
        .collect();
    assert_eq!(order, vec!["circulatory", "digestive", "respiratory", "neoplasms"]);
}

/// Test that the report does not depend on how many categories run at once
#[tokio::test]
async fn test_concurrency_does_not_change_report() {
    let store = condition_store();
    let registry = condition_registry();

    let serial = BatchOrchestrator::new(&store, AnalysisConfig::default().with_concurrency(1))
        .prevalence_report::<&str>(&registry, None)
        .await
        .unwrap();
    let parallel = BatchOrchestrator::new(&store, AnalysisConfig::default().with_concurrency(8))
        .prevalence_report::<&str>(&registry, None)
        .await
        .unwrap();
    assert_eq!(serial, parallel);
}

/// Test that a subset request only queries the requested categories
#[tokio::test]
async fn test_subset_queries() {
    let store = condition_store();
    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let report = orchestrator
        .prevalence_report(&condition_registry(), Some(&["respiratory", "respiratory"][..]))
        .await
        .unwrap();

    assert_eq!(report.len(), 1);
    // baseline, resolution and count
    assert_eq!(store.queries(), 3);
    assert!(report.get("circulatory").is_none());
    assert!(!report.is_missing("circulatory"));
}

/// Test that an empty concept set is counted without a store query
#[tokio::test]
async fn test_unmapped_category_skips_count_query() {
    let store = condition_store();
    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let report = orchestrator
        .prevalence_report(&condition_registry(), Some(&["digestive"][..]))
        .await
        .unwrap();

    assert_eq!(report.get("digestive").unwrap().patient_count, 0);
    // baseline and resolution
    assert_eq!(store.queries(), 2);
}

/// Test that an empty population aborts the run
#[tokio::test]
async fn test_zero_population() {
    let store = ScriptedStore::new().with_resolution("J00", &RESPIRATORY);
    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let result = orchestrator
        .prevalence_report::<&str>(&condition_registry(), None)
        .await;

    assert!(matches!(result, Err(PrevalenceError::ZeroPopulation)));
    assert_eq!(store.queries(), 1);
}

/// Test that validation errors come before any store query
#[tokio::test]
async fn test_validation_before_queries() {
    let store = condition_store();
    let registry = condition_registry();

    let unknown = BatchOrchestrator::new(&store, AnalysisConfig::default())
        .prevalence_report(&registry, Some(&["respiratory", "renal"][..]))
        .await;
    assert!(matches!(unknown, Err(PrevalenceError::UnknownCategory(id)) if id == "renal"));

    let mut config = AnalysisConfig::default();
    config.cdm_schema = "cdm; drop table person".to_string();
    let schema = BatchOrchestrator::new(&store, config)
        .prevalence_report::<&str>(&registry, None)
        .await;
    assert!(matches!(schema, Err(PrevalenceError::InvalidSchema(_))));

    let window = TimeWindow {
        start: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end: chrono::NaiveDate::from_ymd_opt(2020, 1, 1),
    };
    let inverted = BatchOrchestrator::new(&store, AnalysisConfig::default().with_window(window))
        .prevalence_report::<&str>(&registry, None)
        .await;
    assert!(matches!(inverted, Err(PrevalenceError::StartAfterEnd { .. })));

    assert_eq!(store.queries(), 0);
}
