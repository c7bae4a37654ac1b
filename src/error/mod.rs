//! Error handling for prevalence runs.
//!
//! Errors fall into three groups: input validation (raised before any store
//! access), population errors (abort the run), and store errors (raised per
//! category and handled by the orchestrator's failure policy).

use std::io;
use std::time::Duration;

use arrow::error::ArrowError;
use chrono::NaiveDate;
use parquet::errors::ParquetError;

/// Errors raised by the vocabulary or event store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store rejected or failed to execute a query
    #[error("Query failed: {0}")]
    Query(String),

    /// The connection to the store is closed or no longer valid
    #[error("Connection closed: {0}")]
    ConnectionClosed(String),

    /// A query did not finish before its deadline
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    /// Error opening or reading a snapshot file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error decoding a Parquet snapshot table
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error reading Arrow columns from a snapshot table
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error decoding a JSON snapshot
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A snapshot table is missing a column or has the wrong column type
    #[error("Malformed table '{table}': {message}")]
    MalformedTable { table: String, message: String },
}

impl StoreError {
    /// Whether retrying the same query could succeed
    ///
    /// Only connectivity failures are transient. Timeouts are not retried, a
    /// timed-out category fails under the active failure policy.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionClosed(_))
    }
}

/// Specialized error type for prevalence runs
#[derive(Debug, thiserror::Error)]
pub enum PrevalenceError {
    /// A requested category id is not registered
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// The data schema name is not a plain identifier
    #[error("Invalid schema name: '{0}'")]
    InvalidSchema(String),

    /// A date string is not in `YYYY-MM-DD` form
    #[error("Invalid date format: '{0}' (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    /// The analysis window does not satisfy `start < end`
    #[error("Window start {start} is not before end {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A category catalog is inconsistent (duplicate ids, bad predicate)
    #[error("Invalid registry: {0}")]
    InvalidRegistry(String),

    /// The baseline population is empty, so no rate is defined
    #[error("Baseline population is zero; rates are undefined")]
    ZeroPopulation,

    /// A store error raised while computing the baseline totals
    #[error("Baseline query failed: {0}")]
    Baseline(#[source] StoreError),

    /// A store error raised while computing one category
    #[error("Category '{category_id}' failed: {source}")]
    Category {
        category_id: String,
        #[source]
        source: StoreError,
    },

    /// Error loading configuration or catalogs
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error decoding configuration or catalogs
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Store error outside any category pipeline (snapshot loading)
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PrevalenceError {
    /// Whether this error was detected before any store access
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UnknownCategory(_)
                | Self::InvalidSchema(_)
                | Self::InvalidDateFormat(_)
                | Self::StartAfterEnd { .. }
                | Self::InvalidConfig(_)
                | Self::InvalidRegistry(_)
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type for prevalence operations
pub type Result<T> = std::result::Result<T, PrevalenceError>;
