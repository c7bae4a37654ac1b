//! Configuration for prevalence runs.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PrevalenceError, Result};
use crate::models::TimeWindow;
use crate::models::window::parse_date;

/// What to do when one category's pipeline fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any category failure aborts the whole report
    #[default]
    AbortOnFirstError,
    /// Failed categories are logged, listed as missing and left out
    SkipAndContinue,
}

/// Configuration for a prevalence run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the schema holding the clinical tables
    pub cdm_schema: String,
    /// Window events must fall in
    pub window: TimeWindow,
    /// Handling of per-category failures
    pub failure_policy: FailurePolicy,
    /// Maximum number of categories computed concurrently
    pub concurrency: usize,
    /// Deadline for each individual store query, in milliseconds
    pub query_timeout_ms: u64,
    /// Retries for transient connectivity errors
    pub max_retries: u32,
    /// Show a progress bar while categories are computed
    pub show_progress: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cdm_schema: "cdm".to_string(),
            window: TimeWindow::default(),
            failure_policy: FailurePolicy::default(),
            concurrency: num_cpus::get(),
            query_timeout_ms: 300_000,
            max_retries: 0,
            show_progress: false,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from a JSON file, filling unset fields with defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON configuration
    ///
    /// Window bounds that are not `YYYY-MM-DD` dates fail with
    /// [`PrevalenceError::InvalidDateFormat`].
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        if let Some(window) = value.get("window") {
            for bound in ["start", "end"] {
                if let Some(date) = window.get(bound).and_then(Value::as_str) {
                    parse_date(date)?;
                }
            }
        }
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-query deadline, kept to millisecond precision
    #[must_use]
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Deadline for each store query
    #[must_use]
    pub const fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    /// Check every setting before any store is touched
    pub fn validate(&self) -> Result<()> {
        validate_schema_name(&self.cdm_schema)?;
        self.window.validate()?;
        if self.concurrency == 0 {
            return Err(PrevalenceError::InvalidConfig(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.query_timeout_ms == 0 {
            return Err(PrevalenceError::InvalidConfig(
                "query timeout must be at least 1 millisecond".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for AnalysisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis Configuration:")?;
        writeln!(f, "  Schema: {}", self.cdm_schema)?;
        writeln!(f, "  Window: {}", self.window)?;
        writeln!(f, "  Failure Policy: {:?}", self.failure_policy)?;
        writeln!(f, "  Concurrency: {}", self.concurrency)?;
        writeln!(f, "  Query Timeout: {:?}", self.query_timeout())?;
        writeln!(f, "  Max Retries: {}", self.max_retries)?;
        Ok(())
    }
}

/// Check that a schema name is a plain identifier
///
/// Schema names end up in table locations, so only ASCII letters, digits and
/// underscores are accepted, starting with a letter or underscore.
pub fn validate_schema_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PrevalenceError::InvalidSchema(name.to_string()))
    }
}
