//! The batch pipeline: recreate tables, load station files, aggregate, load yields.

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use tracing::info;

use crate::{
    aggregate::aggregate_yearly,
    db::{self, schema, sqlite::count_rows, CROP_YIELDS, WEATHER, WEATHER_YEARLY},
    deserialise::{ingest_directory, load_yield_file, IngestReport, YieldReport},
};

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub db_path: PathBuf,
    pub weather_dir: PathBuf,
    pub yield_file: PathBuf,
}

#[derive(Debug)]
pub struct PipelineReport {
    pub ingest: IngestReport,
    pub yearly_inserted: u64,
    pub yields: YieldReport,
    pub weather_rows: i64,
    pub yearly_rows: i64,
    pub yield_rows: i64,
    pub elapsed: Duration,
}

/// Runs the whole pipeline against `config.db_path`, dropping any existing
/// tables first. Steps run strictly in order; aggregation only starts once
/// every station file has been loaded.
pub async fn run_pipeline(config: &PipelineConfig, started: Instant) -> Result<PipelineReport> {
    let pool = db::connect(&config.db_path).await?;
    schema::recreate(&pool).await?;

    let ingest = ingest_directory(&config.weather_dir, &pool).await?;
    info!(
        "Loaded {} rows from {} files ({} duplicates, {} skipped lines, {} failed files)",
        ingest.rows.inserted,
        ingest.files_loaded,
        ingest.rows.duplicates,
        ingest.rows.skipped,
        ingest.failures.len()
    );

    let yearly_inserted = aggregate_yearly(&pool).await?;
    info!("Wrote {yearly_inserted} yearly aggregates");

    let yields = load_yield_file(&config.yield_file, &pool).await?;
    info!(
        "Loaded {} crop yield records ({} duplicates, {} skipped lines)",
        yields.inserted,
        yields.duplicates,
        yields.skipped.len()
    );

    let report = PipelineReport {
        ingest,
        yearly_inserted,
        yields,
        weather_rows: count_rows(&pool, WEATHER).await?,
        yearly_rows: count_rows(&pool, WEATHER_YEARLY).await?,
        yield_rows: count_rows(&pool, CROP_YIELDS).await?,
        elapsed: started.elapsed(),
    };

    pool.close().await;

    Ok(report)
}

pub async fn ingest(config: PipelineConfig) -> Result<PipelineReport> {
    let report = run_pipeline(&config, Instant::now()).await?;

    println!("Data successfully imported into weather, yearly, and yield SQLite tables.");
    println!("Elapsed processing time: {:.6} seconds", report.elapsed.as_secs_f64());
    println!("Total records in the weather station table: {}", report.weather_rows);
    println!("Yearly aggregates written: {}", report.yearly_inserted);
    println!("Total records in the yearly table: {}", report.yearly_rows);
    println!("Total records in the crop yield table: {}", report.yield_rows);

    for failure in &report.ingest.failures {
        println!("Failed to load {}: {}", failure.path.display(), failure.reason);
    }
    if !report.yields.skipped.is_empty() {
        println!("Skipped {} malformed crop yield lines", report.yields.skipped.len());
    }

    Ok(report)
}

// -- Tests -------------------------------------------------------------------
