//! Deadline and retry handling for store queries

use std::time::Duration;

use log::debug;
use tokio::time::timeout;

use crate::config::AnalysisConfig;
use crate::error::{StoreError, StoreResult};
use crate::store::StoreFuture;

/// Deadline and retry budget applied to every store query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    /// Deadline for a single attempt
    pub timeout: Duration,
    /// Extra attempts allowed after a transient error
    pub max_retries: u32,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl QueryPolicy {
    #[must_use]
    pub const fn new(timeout: Duration, max_retries: u32) -> Self {
        Self {
            timeout,
            max_retries,
        }
    }

    #[must_use]
    pub const fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.query_timeout(), config.max_retries)
    }

    /// Run a store query under the deadline
    ///
    /// `query` is called once per attempt. Only transient errors are retried;
    /// a deadline overrun fails immediately with [`StoreError::Timeout`].
    pub async fn run<'a, T, F>(&self, mut query: F) -> StoreResult<T>
    where
        F: FnMut() -> StoreFuture<'a, T>,
    {
        let mut attempt = 0;
        loop {
            match timeout(self.timeout, query()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(error)) if error.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    debug!(
                        "Retrying store query after transient error ({attempt}/{}): {error}",
                        self.max_retries
                    );
                }
                Ok(Err(error)) => return Err(error),
                Err(_) => return Err(StoreError::Timeout(self.timeout)),
            }
        }
    }
}
