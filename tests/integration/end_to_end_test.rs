use cdm_prevalence::{
    AnalysisConfig, BatchOrchestrator, CdmSnapshot, InMemoryStore, TimeWindow, registry_from_arg,
};
use serde_json::json;

/// Snapshot exercising the shipped ICD-10-CM and ATC catalogs
fn snapshot_json() -> serde_json::Value {
    json!({
        "concepts": [
            {"concept_id": 1, "concept_code": "J45.909", "vocabulary_id": "ICD10CM"},
            {"concept_id": 2, "concept_code": "J99.1", "vocabulary_id": "ICD10CM"},
            {"concept_id": 3, "concept_code": "I10", "vocabulary_id": "ICD10CM"},
            {"concept_id": 4, "concept_code": "C07AB02", "vocabulary_id": "ATC"},
            {"concept_id": 5, "concept_code": "N02BE01", "vocabulary_id": "ATC"},
            {"concept_id": 10, "concept_code": "195967001", "vocabulary_id": "SNOMED"},
            {"concept_id": 11, "concept_code": "233604007", "vocabulary_id": "SNOMED"},
            {"concept_id": 20, "concept_code": "59621000", "vocabulary_id": "SNOMED"},
            {"concept_id": 100, "concept_code": "6918", "vocabulary_id": "RxNorm"},
            {"concept_id": 101, "concept_code": "866924", "vocabulary_id": "RxNorm"},
            {"concept_id": 200, "concept_code": "161", "vocabulary_id": "RxNorm"}
        ],
        "relationships": [
            {"concept_id_1": 1, "concept_id_2": 10, "relationship_id": "Maps to"},
            {"concept_id_1": 2, "concept_id_2": 11, "relationship_id": "Maps to"},
            {"concept_id_1": 3, "concept_id_2": 20, "relationship_id": "Maps to"},
            {"concept_id_1": 3, "concept_id_2": 10, "relationship_id": "Is a"},
            {"concept_id_1": 4, "concept_id_2": 100, "relationship_id": "Maps to"},
            {"concept_id_1": 5, "concept_id_2": 200, "relationship_id": "Maps to"}
        ],
        "ancestors": [
            {"ancestor_concept_id": 100, "descendant_concept_id": 100},
            {"ancestor_concept_id": 100, "descendant_concept_id": 101},
            {"ancestor_concept_id": 200, "descendant_concept_id": 200}
        ],
        "persons": [{"person_id": 1}, {"person_id": 2}, {"person_id": 3}, {"person_id": 4}],
        "condition_occurrences": [
            {"person_id": 1, "condition_concept_id": 10, "condition_start_date": "2018-02-01"},
            {"person_id": 2, "condition_concept_id": 10, "condition_start_date": "2019-01-01",
             "condition_end_date": "2019-01-05"},
            {"person_id": 2, "condition_concept_id": 20, "condition_start_date": "2020-01-01"},
            {"person_id": 3, "condition_concept_id": 11, "condition_start_date": "2020-01-01"},
            {"person_id": 4, "condition_concept_id": 20, "condition_start_date": "2015-01-01"}
        ],
        "drug_exposures": [
            {"person_id": 1, "drug_concept_id": 101, "drug_exposure_start_date": "2018-01-01"},
            {"person_id": 1, "drug_concept_id": 101, "drug_exposure_start_date": "2018-06-01"},
            {"person_id": 2, "drug_concept_id": 100, "drug_exposure_start_date": "2019-01-01"},
            {"person_id": 3, "drug_concept_id": 200, "drug_exposure_start_date": "2020-01-01"},
            {"person_id": 4, "drug_concept_id": 100, "drug_exposure_start_date": "2025-01-01"}
        ]
    })
}

fn store() -> InMemoryStore {
    let snapshot = CdmSnapshot::from_json_str(&snapshot_json().to_string()).unwrap();
    InMemoryStore::new(snapshot)
}

/// Test ICD-10 chapter prevalence against a JSON snapshot
#[tokio::test]
async fn test_icd10_chapters_end_to_end() {
    let store = store();
    let registry = registry_from_arg("icd10").unwrap();
    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let report = orchestrator
        .prevalence_report(
            &registry,
            Some(&["neoplasms", "circulatory", "respiratory"][..]),
        )
        .await
        .unwrap();

    let order: Vec<_> = report
        .records
        .iter()
        .map(|r| r.category_id.as_str())
        .collect();
    assert_eq!(order, vec!["respiratory", "circulatory", "neoplasms"]);

    let respiratory = report.get("respiratory").unwrap();
    assert_eq!(respiratory.patient_count, 2);
    assert_eq!(respiratory.prevalence_pct, 50.00);
    assert_eq!(respiratory.prevalence_per_100k, 50_000.00);

    let circulatory = report.get("circulatory").unwrap();
    assert_eq!(circulatory.patient_count, 1);
    assert_eq!(circulatory.prevalence_pct, 25.00);

    assert_eq!(report.get("neoplasms").unwrap().patient_count, 0);
    assert_eq!(report.baseline.total_patients, 4);
}

/// Test ATC main group utilization against a JSON snapshot
#[tokio::test]
async fn test_atc_main_groups_end_to_end() {
    let store = store();
    let registry = registry_from_arg("atc").unwrap();
    let orchestrator = BatchOrchestrator::new(&store, AnalysisConfig::default());
    let report = orchestrator
        .utilization_report::<&str>(&registry, None)
        .await
        .unwrap();

    assert_eq!(report.len(), 14);
    assert_eq!(report.baseline.total_events, Some(4));

    let cardio = &report.records[0];
    assert_eq!(cardio.category_id, "C");
    assert_eq!(cardio.prescription_count, 3);
    assert_eq!(cardio.percentage_of_total, 75.00);
    assert_eq!(cardio.rate_per_100k, 75_000.00);

    let nervous = &report.records[1];
    assert_eq!(nervous.category_id, "N");
    assert_eq!(nervous.percentage_of_total, 25.00);

    let rest: Vec<_> = report.records[2..]
        .iter()
        .map(|r| r.category_id.as_str())
        .collect();
    assert_eq!(rest, vec!["A", "B", "D", "G", "H", "J", "L", "M", "P", "R", "S", "V"]);
}

/// Test that an open window counts events after the default end date
#[tokio::test]
async fn test_open_window() {
    let store = store();
    let registry = registry_from_arg("atc").unwrap();
    let window = TimeWindow::parse("2016-01-01", None).unwrap();
    let orchestrator =
        BatchOrchestrator::new(&store, AnalysisConfig::default().with_window(window));
    let report = orchestrator
        .prevalence_report(&registry, Some(&["C"][..]))
        .await
        .unwrap();

    assert_eq!(report.get("C").unwrap().patient_count, 3);
}

/// Test loading the snapshot from a file and serializing the report
#[tokio::test]
async fn test_json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, snapshot_json().to_string()).unwrap();

    let store = InMemoryStore::new(CdmSnapshot::from_json_file(&path).unwrap());
    let registry = registry_from_arg("icd10").unwrap();
    let report = BatchOrchestrator::new(&store, AnalysisConfig::default())
        .prevalence_report(&registry, Some(&["respiratory"][..]))
        .await
        .unwrap();

    let value = serde_json::to_value(&report).unwrap();
    let record = &value["records"][0];
    assert_eq!(record["category_id"], "respiratory");
    assert_eq!(record["code_start"], "J00");
    assert_eq!(record["code_end"], "J99");
    assert_eq!(record["patient_count"], 2);
    assert_eq!(record["prevalence_pct"], 50.0);
    assert_eq!(record["date_range"]["start"], "2016-01-01");
    assert_eq!(value["missing"], json!([]));
}
