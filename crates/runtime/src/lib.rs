//! Runtime bootstrap and the two-phase ingest/estimate pipeline.

use anyhow::{Context, Result};
use ltv_core::{EventStore, LtvResult};
use ltv_estimator::top_x_simple_ltv;
use ltv_ingest::read_events;
use ltv_views::write_report;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod metrics;

pub use config::PipelineConfig;
use metrics::{MetricsSnapshot, PhaseTimer, RunMetrics};

/// Install the fmt subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init();
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub results: Vec<LtvResult>,
    pub metrics: MetricsSnapshot,
}

/// Ingest the whole input, then rank customers and write the report.
///
/// Nothing is written unless both phases succeed.
pub fn run_pipeline(config: &PipelineConfig) -> Result<RunSummary> {
    config.validate()?;
    let metrics = RunMetrics::default();
    let run_timer = PhaseTimer::start();

    let ingest_timer = PhaseTimer::start();
    let mut store = EventStore::new();
    let read = read_events(&config.input_path, config.format, &mut store)
        .with_context(|| format!("ingesting {}", config.input_path.display()))?;
    metrics.inc_records_read(read.records as u64);
    metrics.inc_events_ingested(read.appended as u64);
    metrics.inc_events_skipped(read.skipped as u64);
    metrics.record_customers(store.len() as u64);
    info!(
        records = read.records,
        skipped = read.skipped,
        customers = store.len(),
        duration_ms = ingest_timer.elapsed().as_millis(),
        "ingestion complete"
    );

    let results = top_x_simple_ltv(config.top_n, &store).context("estimating lifetime values")?;

    info!(
        top_n = config.top_n,
        path = %config.output_path.display(),
        "writing top customers"
    );
    let written = write_report(&config.output_path, &results)?;
    metrics.inc_results_written(written as u64);

    let snapshot = metrics.snapshot();
    info!("{}", snapshot.to_json_line("run", Some(run_timer.elapsed())));
    Ok(RunSummary {
        results,
        metrics: snapshot,
    })
}
