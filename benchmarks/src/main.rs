use std::str::FromStr;

use anyhow::Result;
use clap::Parser;
use pgingest_benchmarks::{
    cli::{Args, Backend},
    ingest::{Report, Runner},
};
use pgingest_core::memory::MemoryStore;
use pgingest_storage_postgres::Postgres;
use tracing::{Level, info};

#[tokio::main]
async fn main() -> Result<()> {
    let level = std::env::var("LOG_LEVEL").ok().and_then(|level| Level::from_str(&level).ok()).unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    let args = Args::parse();
    let config = args.run_config()?;
    info!(
        "pgingest: {} points x {} attrs on {:?}, batch {:?}, groups {:?}, fetch {:?}",
        config.total_points, config.attribute_count, args.backend, config.batch_sizes, config.group_sizes, config.fetch_sizes
    );

    let report = match args.backend {
        Backend::Postgres => Runner::new(Postgres::connect(&args.database_url).await?, config).run().await?,
        Backend::Memory => Runner::new(MemoryStore::new(), config).run().await?,
    };

    write_report(&report, &args)
}

fn write_report(report: &Report, args: &Args) -> Result<()> {
    report.print_summary();
    report.save_csv(&args.output)?;
    info!("pgingest: results written to {}", args.output.display());
    if !report.reads.is_empty() {
        report.save_reads_csv(&args.read_output)?;
        info!("pgingest: read results written to {}", args.read_output.display());
    }
    Ok(())
}
