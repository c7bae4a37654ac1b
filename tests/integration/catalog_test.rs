use cdm_prevalence::utils::test::sample_store;
use cdm_prevalence::{
    AnalysisConfig, BatchOrchestrator, PrevalenceError, ResolutionStrategy, registry_from_arg,
};
use serde_json::json;

/// Test a custom catalog mixing predicate kinds, loaded from JSON
#[tokio::test]
async fn test_json_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("asthma.json");
    let catalog = json!({
        "name": "asthma_watch",
        "source_vocabulary": "ICD10",
        "strategy": "direct",
        "domain": "condition",
        "categories": [
            {"id": "asthma", "display_name": "Asthma",
             "predicate": {"kind": "exact_set", "codes": ["J45", "X99"]}},
            {"id": "copd", "display_name": "COPD",
             "predicate": {"kind": "prefix", "prefix": "J44"}},
            {"id": "chapter", "display_name": "Respiratory chapter",
             "predicate": {"kind": "range", "low": "J00", "high": "J99"}}
        ]
    });
    std::fs::write(&path, catalog.to_string()).unwrap();

    let registry = registry_from_arg(path.to_str().unwrap()).unwrap();
    assert_eq!(registry.name(), "asthma_watch");
    assert_eq!(registry.strategy(), ResolutionStrategy::Direct);
    assert_eq!(registry.len(), 3);

    let store = sample_store();
    let report = BatchOrchestrator::new(&store, AnalysisConfig::default())
        .prevalence_report::<&str>(&registry, None)
        .await
        .unwrap();

    let asthma = report.get("asthma").unwrap();
    assert_eq!(asthma.code_start, "J45");
    assert_eq!(asthma.code_end, "X99");
    assert_eq!(asthma.patient_count, 2);
    assert_eq!(report.get("copd").unwrap().patient_count, 1);
    assert_eq!(report.get("chapter").unwrap().patient_count, 2);
}

/// Test that inconsistent catalogs are rejected when loaded
#[test]
fn test_invalid_catalogs() {
    let dir = tempfile::tempdir().unwrap();

    let duplicate = dir.path().join("duplicate.json");
    let catalog = json!({
        "name": "dup",
        "source_vocabulary": "ATC",
        "strategy": "mapped_expanded",
        "domain": "drug_exposure",
        "categories": [
            {"id": "C", "display_name": "Cardio", "predicate": {"kind": "prefix", "prefix": "C"}},
            {"id": "C", "display_name": "Again", "predicate": {"kind": "prefix", "prefix": "C0"}}
        ]
    });
    std::fs::write(&duplicate, catalog.to_string()).unwrap();
    assert!(matches!(
        registry_from_arg(duplicate.to_str().unwrap()),
        Err(PrevalenceError::InvalidRegistry(_))
    ));

    let inverted = dir.path().join("inverted.json");
    let catalog = json!({
        "name": "inverted",
        "source_vocabulary": "ICD10CM",
        "strategy": "direct",
        "domain": "condition",
        "categories": [
            {"id": "x", "display_name": "X",
             "predicate": {"kind": "range", "low": "J99", "high": "J00"}}
        ]
    });
    std::fs::write(&inverted, catalog.to_string()).unwrap();
    assert!(matches!(
        registry_from_arg(inverted.to_str().unwrap()),
        Err(PrevalenceError::InvalidRegistry(_))
    ));
}
