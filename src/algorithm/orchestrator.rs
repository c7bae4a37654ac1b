//! Batch computation of category reports
//!
//! A run validates its inputs, computes the baseline once, then drives every
//! requested category through resolution, counting and rate computation with
//! bounded concurrency. Records come back ranked.

use std::time::Instant;

use futures::stream::{self, StreamExt};
use log::debug;

use super::aggregator;
use super::counter::OccurrenceCounter;
use super::query::QueryPolicy;
use super::resolver::VocabularyResolver;
use crate::config::{AnalysisConfig, FailurePolicy};
use crate::error::{PrevalenceError, Result, StoreResult};
use crate::models::{
    Baseline, Category, CategoryFailure, CountResult, PrevalenceReport, Ranked, Report, TimeWindow,
    UtilizationReport,
};
use crate::registry::CategoryRegistry;
use crate::store::{EventStore, Measure, VocabularyStore};
use crate::utils::logging::{
    create_category_progress_bar, finish_progress_bar, log_category_skipped, log_run_complete,
    log_run_start,
};

/// Drives report runs against one store
#[derive(Debug)]
pub struct BatchOrchestrator<'s, S: ?Sized> {
    store: &'s S,
    config: AnalysisConfig,
}

impl<'s, S> BatchOrchestrator<'s, S>
where
    S: VocabularyStore + EventStore + ?Sized,
{
    #[must_use]
    pub const fn new(store: &'s S, config: AnalysisConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Prevalence of each category among distinct persons
    ///
    /// # Arguments
    /// * `registry` - Registry the categories come from
    /// * `category_ids` - Requested subset of category ids, `None` for all
    ///
    /// # Errors
    /// Invalid configuration or an unknown category id fails before any
    /// store query. An empty population fails the whole run, as does any
    /// category failure under [`FailurePolicy::AbortOnFirstError`].
    pub async fn prevalence_report<I: AsRef<str>>(
        &self,
        registry: &CategoryRegistry,
        category_ids: Option<&[I]>,
    ) -> Result<PrevalenceReport> {
        let measure = Measure::persons(registry.domain());
        self.run(registry, category_ids, measure, aggregator::prevalence)
            .await
    }

    /// Event-record counts of each category as a share of all in-window
    /// events and as a rate per 100k persons
    ///
    /// # Errors
    /// Same as [`Self::prevalence_report`].
    pub async fn utilization_report<I: AsRef<str>>(
        &self,
        registry: &CategoryRegistry,
        category_ids: Option<&[I]>,
    ) -> Result<UtilizationReport> {
        let measure = Measure::events(registry.domain());
        self.run(registry, category_ids, measure, aggregator::utilization)
            .await
    }

    async fn run<I, R, F>(
        &self,
        registry: &CategoryRegistry,
        category_ids: Option<&[I]>,
        measure: Measure,
        build: F,
    ) -> Result<Report<R>>
    where
        I: AsRef<str>,
        R: Ranked,
        F: Fn(u64, &Baseline, &Category, &TimeWindow) -> Result<R>,
    {
        self.config.validate()?;
        let categories = registry.select(category_ids)?;
        let window = self.config.window;

        let start = Instant::now();
        log_run_start(registry.name(), categories.len(), &window);

        let policy = QueryPolicy::from_config(&self.config);
        let resolver = VocabularyResolver::new(self.store, policy);
        let counter = OccurrenceCounter::new(self.store, policy);

        let baseline = counter
            .baseline(&window, measure)
            .await
            .map_err(PrevalenceError::Baseline)?;
        if baseline.total_patients == 0 {
            return Err(PrevalenceError::ZeroPopulation);
        }
        debug!("Baseline for {}: {baseline:?}", registry.name());

        let pb = create_category_progress_bar(
            categories.len() as u64,
            registry.name(),
            self.config.show_progress,
        );

        let resolver = &resolver;
        let counter = &counter;
        let window_ref = &window;
        let pb_ref = &pb;
        let mut outcomes = stream::iter(categories)
            .map(|category| async move {
                let result =
                    count_category(resolver, counter, registry, category, window_ref, measure)
                        .await;
                pb_ref.inc(1);
                (category, result)
            })
            .buffered(self.config.concurrency);

        let mut records = Vec::new();
        let mut missing = Vec::new();
        while let Some((category, result)) = outcomes.next().await {
            match result {
                Ok(result) => records.push(build(result.count, &baseline, category, &window)?),
                Err(source) => {
                    let error = PrevalenceError::Category {
                        category_id: category.id.clone(),
                        source,
                    };
                    match self.config.failure_policy {
                        FailurePolicy::AbortOnFirstError => {
                            pb.abandon();
                            return Err(error);
                        }
                        FailurePolicy::SkipAndContinue => {
                            log_category_skipped(&category.id, &error);
                            missing.push(CategoryFailure {
                                category_id: category.id.clone(),
                                reason: error.to_string(),
                            });
                        }
                    }
                }
            }
        }

        finish_progress_bar(&pb, Some("done"));
        log_run_complete(
            registry.name(),
            records.len(),
            missing.len(),
            start.elapsed(),
        );
        Ok(Report::new(records, missing, window, baseline))
    }
}

async fn count_category<V, E>(
    resolver: &VocabularyResolver<'_, V>,
    counter: &OccurrenceCounter<'_, E>,
    registry: &CategoryRegistry,
    category: &Category,
    window: &TimeWindow,
    measure: Measure,
) -> StoreResult<CountResult>
where
    V: VocabularyStore + ?Sized,
    E: EventStore + ?Sized,
{
    let concepts = resolver.resolve(registry, category).await?;
    let count = counter.count(&concepts, window, measure).await?;
    Ok(CountResult::new(category.id.as_str(), count))
}
