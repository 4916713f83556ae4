use clap::{Parser, Subcommand};
use tracing::info;

use finmart::config::Config;
use finmart::observability::metrics as obs;
use finmart::{gateway, logging, mockdata, pipeline, warehouse};

#[derive(Parser)]
#[command(name = "finmart")]
#[command(about = "Batch ETL pipeline for a toy financial data mart")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the seeded mock raw CSVs
    Generate,
    /// Stage raw CSVs into the blob layout with checksum receipts
    Ingest,
    /// Transform raw CSVs into the star schema and write the run reports
    Transform,
    /// Infer warehouse column types and emit load DDL for processed outputs
    PlanLoad,
    /// Run generate, ingest, transform, and plan-load in sequence
    FullPipeline,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::load()?;
    logging::init_logging(&config.logs_dir);
    let recorder = obs::install_recorder();

    match cli.command {
        Commands::Generate => {
            mockdata::generate(&config.raw_dir(), &config.generator)?;
        }
        Commands::Ingest => {
            let receipts =
                gateway::ingest_raw_files(&config.raw_dir(), &config.blob_root, &config.ingest_log_path())?;
            info!(files = receipts.len(), "ingest finished");
        }
        Commands::Transform => {
            let outcome =
                pipeline::run_transform(&config.raw_dir(), &config.processed_dir(), &config.logs_dir)?;
            let dropped: u64 = outcome.dq.iter().map(|record| record.dropped_count).sum();
            info!(tables = outcome.metrics.len(), rows_dropped = dropped, "transform finished");
        }
        Commands::PlanLoad => {
            let plan = warehouse::plan_load(&config.processed_dir(), &config.ddl_dir, &config.logs_dir)?;
            info!(tables = plan.len(), "load planning finished");
        }
        Commands::FullPipeline => {
            mockdata::generate(&config.raw_dir(), &config.generator)?;
            gateway::ingest_raw_files(&config.raw_dir(), &config.blob_root, &config.ingest_log_path())?;
            pipeline::run_transform(&config.raw_dir(), &config.processed_dir(), &config.logs_dir)?;
            warehouse::plan_load(&config.processed_dir(), &config.ddl_dir, &config.logs_dir)?;
            info!("full pipeline finished");
        }
    }

    // Snapshot the metrics registry for a textfile collector
    if let Some(handle) = recorder {
        obs::write_textfile(&handle, &config.logs_dir.join("finmart_metrics.prom"))?;
    }
    Ok(())
}
