//! Parquet snapshot loading
//!
//! Reads the vocabulary and event tables from `<root>/<schema>/<table>.parquet`
//! into a [`CdmSnapshot`]. Columns are cast to the expected Arrow types, so
//! `Int32` ids and `Utf8`/`Timestamp` dates in extracts are accepted.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use arrow::array::{Array, ArrayRef, Date32Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::snapshot::{
    CdmSnapshot, ClinicalEvent, Concept, ConceptAncestor, ConceptRelationship, Person,
};
use crate::config::validate_schema_name;
use crate::error::{Result, StoreError, StoreResult};
use crate::utils::logging::{log_operation_complete, log_operation_start, log_warning};

/// Days from 0001-01-01 (CE day 1) to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Location of one table of a schema
#[must_use]
pub fn table_path(root: &Path, schema: &str, table: &str) -> PathBuf {
    root.join(schema).join(format!("{table}.parquet"))
}

/// Load a snapshot from Parquet files
///
/// The schema name is validated before any file is opened. The
/// `concept_ancestor` table is optional; without it no hierarchy expansion
/// takes place.
pub fn load_snapshot(root: &Path, schema: &str) -> Result<CdmSnapshot> {
    validate_schema_name(schema)?;
    let start = Instant::now();
    let schema_dir = root.join(schema);
    log_operation_start("Loading snapshot from", &schema_dir);

    let ancestor_path = table_path(root, schema, "concept_ancestor");
    let ancestors = if ancestor_path.exists() {
        read_table(&ancestor_path, "concept_ancestor", ancestor_rows)?
    } else {
        log_warning(
            "No concept_ancestor table, hierarchy expansion disabled",
            Some(&ancestor_path),
        );
        Vec::new()
    };

    let snapshot = CdmSnapshot {
        concepts: read_table(&table_path(root, schema, "concept"), "concept", concept_rows)?,
        relationships: read_table(
            &table_path(root, schema, "concept_relationship"),
            "concept_relationship",
            relationship_rows,
        )?,
        ancestors,
        persons: read_table(&table_path(root, schema, "person"), "person", person_rows)?,
        condition_occurrences: read_table(
            &table_path(root, schema, "condition_occurrence"),
            "condition_occurrence",
            condition_rows,
        )?,
        drug_exposures: read_table(
            &table_path(root, schema, "drug_exposure"),
            "drug_exposure",
            drug_rows,
        )?,
    };

    log_operation_complete(
        "loaded",
        &schema_dir,
        snapshot.row_count(),
        Some(start.elapsed()),
    );
    Ok(snapshot)
}

/// Load a snapshot on the blocking thread pool
pub async fn load_snapshot_async(root: PathBuf, schema: String) -> Result<CdmSnapshot> {
    tokio::task::spawn_blocking(move || load_snapshot(&root, &schema))
        .await
        .map_err(|e| StoreError::Query(format!("Snapshot loading task failed: {e}")))?
}

fn read_table<T>(
    path: &Path,
    table: &str,
    rows: fn(&RecordBatch, &str) -> StoreResult<Vec<T>>,
) -> StoreResult<Vec<T>> {
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    let mut out = Vec::new();
    for batch in reader {
        out.extend(rows(&batch?, table)?);
    }
    log::debug!("Read {} rows from {}", out.len(), path.display());
    Ok(out)
}

fn column(
    batch: &RecordBatch,
    table: &str,
    name: &str,
    data_type: &DataType,
) -> StoreResult<ArrayRef> {
    let idx = batch
        .schema()
        .index_of(name)
        .map_err(|_| malformed(table, format!("missing column '{name}'")))?;
    let column = batch.column(idx);
    if column.data_type() == data_type {
        Ok(column.clone())
    } else {
        Ok(cast(column, data_type)?)
    }
}

fn optional_column(
    batch: &RecordBatch,
    table: &str,
    name: &str,
    data_type: &DataType,
) -> StoreResult<Option<ArrayRef>> {
    if batch.schema().index_of(name).is_err() {
        return Ok(None);
    }
    column(batch, table, name, data_type).map(Some)
}

fn int64s(batch: &RecordBatch, table: &str, name: &str) -> StoreResult<Vec<i64>> {
    let array = column(batch, table, name, &DataType::Int64)?;
    let values = downcast::<Int64Array>(&array, table, name)?;
    (0..values.len())
        .map(|i| {
            if values.is_null(i) {
                Err(malformed(table, format!("null in required column '{name}'")))
            } else {
                Ok(values.value(i))
            }
        })
        .collect()
}

fn strings(batch: &RecordBatch, table: &str, name: &str) -> StoreResult<Vec<String>> {
    let array = column(batch, table, name, &DataType::Utf8)?;
    let values = downcast::<StringArray>(&array, table, name)?;
    (0..values.len())
        .map(|i| {
            if values.is_null(i) {
                Err(malformed(table, format!("null in required column '{name}'")))
            } else {
                Ok(values.value(i).to_string())
            }
        })
        .collect()
}

fn optional_strings(
    batch: &RecordBatch,
    table: &str,
    name: &str,
) -> StoreResult<Vec<Option<String>>> {
    let Some(array) = optional_column(batch, table, name, &DataType::Utf8)? else {
        return Ok(vec![None; batch.num_rows()]);
    };
    let values = downcast::<StringArray>(&array, table, name)?;
    Ok((0..values.len())
        .map(|i| {
            // Empty strings count as unset, as in CSV-derived extracts
            (!values.is_null(i) && !values.value(i).is_empty()).then(|| values.value(i).to_string())
        })
        .collect())
}

fn dates(batch: &RecordBatch, table: &str, name: &str) -> StoreResult<Vec<Option<NaiveDate>>> {
    let array = column(batch, table, name, &DataType::Date32)?;
    let values = downcast::<Date32Array>(&array, table, name)?;
    Ok((0..values.len())
        .map(|i| {
            if values.is_null(i) {
                None
            } else {
                NaiveDate::from_num_days_from_ce_opt(values.value(i) + UNIX_EPOCH_DAYS_FROM_CE)
            }
        })
        .collect())
}

fn downcast<'a, A: Array + 'static>(
    array: &'a ArrayRef,
    table: &str,
    name: &str,
) -> StoreResult<&'a A> {
    array
        .as_any()
        .downcast_ref::<A>()
        .ok_or_else(|| malformed(table, format!("column '{name}' has an unexpected type")))
}

fn malformed(table: &str, message: String) -> StoreError {
    StoreError::MalformedTable {
        table: table.to_string(),
        message,
    }
}

fn concept_rows(batch: &RecordBatch, table: &str) -> StoreResult<Vec<Concept>> {
    let ids = int64s(batch, table, "concept_id")?;
    let codes = strings(batch, table, "concept_code")?;
    let vocabularies = strings(batch, table, "vocabulary_id")?;
    let names = optional_strings(batch, table, "concept_name")?;
    let invalid = optional_strings(batch, table, "invalid_reason")?;
    Ok(ids
        .into_iter()
        .zip(codes)
        .zip(vocabularies)
        .zip(names)
        .zip(invalid)
        .map(|((((concept_id, concept_code), vocabulary_id), name), invalid_reason)| Concept {
            concept_id,
            concept_code,
            vocabulary_id,
            concept_name: name.unwrap_or_default(),
            invalid_reason,
        })
        .collect())
}

fn relationship_rows(batch: &RecordBatch, table: &str) -> StoreResult<Vec<ConceptRelationship>> {
    let sources = int64s(batch, table, "concept_id_1")?;
    let targets = int64s(batch, table, "concept_id_2")?;
    let kinds = strings(batch, table, "relationship_id")?;
    let invalid = optional_strings(batch, table, "invalid_reason")?;
    Ok(sources
        .into_iter()
        .zip(targets)
        .zip(kinds)
        .zip(invalid)
        .map(|(((concept_id_1, concept_id_2), relationship_id), invalid_reason)| {
            ConceptRelationship {
                concept_id_1,
                concept_id_2,
                relationship_id,
                invalid_reason,
            }
        })
        .collect())
}

fn ancestor_rows(batch: &RecordBatch, table: &str) -> StoreResult<Vec<ConceptAncestor>> {
    let ancestors = int64s(batch, table, "ancestor_concept_id")?;
    let descendants = int64s(batch, table, "descendant_concept_id")?;
    Ok(ancestors
        .into_iter()
        .zip(descendants)
        .map(|(ancestor_concept_id, descendant_concept_id)| ConceptAncestor {
            ancestor_concept_id,
            descendant_concept_id,
        })
        .collect())
}

fn person_rows(batch: &RecordBatch, table: &str) -> StoreResult<Vec<Person>> {
    Ok(int64s(batch, table, "person_id")?
        .into_iter()
        .map(|person_id| Person { person_id })
        .collect())
}

fn condition_rows(batch: &RecordBatch, table: &str) -> StoreResult<Vec<ClinicalEvent>> {
    event_rows(
        batch,
        table,
        "condition_concept_id",
        "condition_start_date",
        "condition_end_date",
    )
}

fn drug_rows(batch: &RecordBatch, table: &str) -> StoreResult<Vec<ClinicalEvent>> {
    event_rows(
        batch,
        table,
        "drug_concept_id",
        "drug_exposure_start_date",
        "drug_exposure_end_date",
    )
}

fn event_rows(
    batch: &RecordBatch,
    table: &str,
    concept_column: &str,
    start_column: &str,
    end_column: &str,
) -> StoreResult<Vec<ClinicalEvent>> {
    let persons = int64s(batch, table, "person_id")?;
    let concepts = int64s(batch, table, concept_column)?;
    let starts = dates(batch, table, start_column)?;
    let ends = if batch.schema().index_of(end_column).is_ok() {
        dates(batch, table, end_column)?
    } else {
        vec![None; batch.num_rows()]
    };

    let mut events = Vec::with_capacity(persons.len());
    let rows = persons.into_iter().zip(concepts).zip(starts).zip(ends);
    for (((person_id, concept_id), start), end_date) in rows {
        // Events without a start date can never fall in a window
        let Some(start_date) = start else {
            continue;
        };
        events.push(ClinicalEvent {
            person_id,
            concept_id,
            start_date,
            end_date,
        });
    }
    Ok(events)
}
