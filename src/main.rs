use anyhow::Context;
use cdm_prevalence::utils::logging::{print_prevalence_report, print_utilization_report};
use cdm_prevalence::{
    AnalysisConfig, BatchOrchestrator, CdmSnapshot, InMemoryStore, available_registries,
    load_snapshot_async, registry_from_arg,
};
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

/// Prevalence and utilization rates for clinical classification categories
#[derive(Debug, Parser)]
#[command(name = "cdm-prevalence", version)]
struct Options {
    /// JSON snapshot file, or root directory of Parquet schemas
    snapshot: PathBuf,

    /// Shipped registry name, or path to a JSON catalog
    registry: String,

    /// Count event records instead of distinct persons
    #[arg(long)]
    utilization: bool,

    /// Path to an analysis configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated subset of category ids
    #[arg(long, value_delimiter = ',')]
    categories: Option<Vec<String>>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

async fn load_store(path: &Path, schema: &str) -> anyhow::Result<InMemoryStore> {
    let start = Instant::now();
    let snapshot = if path.extension().is_some_and(|ext| ext == "json") {
        CdmSnapshot::from_json_file(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?
    } else {
        load_snapshot_async(path.to_path_buf(), schema.to_string())
            .await
            .with_context(|| format!("Failed to load parquet tables under {}", path.display()))?
    };
    info!(
        "Loaded {} rows from {} in {:?}",
        snapshot.row_count(),
        path.display(),
        start.elapsed()
    );
    Ok(InMemoryStore::new(snapshot))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::parse();

    let config = match &options.config {
        Some(path) => AnalysisConfig::from_json_file(path)
            .with_context(|| format!("Invalid configuration {}", path.display()))?,
        None => AnalysisConfig::default(),
    };
    info!("{config}");

    let registry = registry_from_arg(&options.registry).with_context(|| {
        format!(
            "Failed to load registry (shipped: {})",
            available_registries().join(", ")
        )
    })?;
    info!("Using registry {registry}");

    let store = load_store(&options.snapshot, &config.cdm_schema).await?;
    let orchestrator = BatchOrchestrator::new(&store, config);
    let categories = options.categories.as_deref();

    if options.utilization {
        let report = orchestrator
            .utilization_report(&registry, categories)
            .await
            .context("Utilization report failed")?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_utilization_report(&report);
        }
    } else {
        let report = orchestrator
            .prevalence_report(&registry, categories)
            .await
            .context("Prevalence report failed")?;
        if options.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_prevalence_report(&report);
        }
    }

    Ok(())
}
