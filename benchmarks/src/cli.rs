//! Command-line surface of the `pgingest` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::ingest::{BenchError, RunConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// A live Postgres server reached through `--database-url`
    Postgres,
    /// The in-process store; exercises the sweep without a database
    Memory,
}

/// Benchmark point ingestion into Postgres across insertion strategies.
#[derive(Debug, Parser)]
#[command(name = "pgingest", version)]
pub struct Args {
    /// Postgres connection string (key=value or URL form)
    #[arg(long, env = "DATABASE_URL", default_value = "host=localhost user=postgres password=postgres dbname=postgres")]
    pub database_url: String,

    #[arg(long, value_enum, default_value_t = Backend::Postgres)]
    pub backend: Backend,

    /// Points inserted by every strategy/size sample
    #[arg(long, default_value_t = crate::ingest::config::DEFAULT_TOTAL_POINTS)]
    pub points: u64,

    /// Attributes per point
    #[arg(long, default_value_t = crate::ingest::config::DEFAULT_ATTRIBUTE_COUNT)]
    pub attrs: usize,

    /// Batch sizes for per-row and multi-row inserts
    #[arg(long, value_delimiter = ',', default_values_t = crate::ingest::config::DEFAULT_BATCH_SIZES)]
    pub batch_sizes: Vec<usize>,

    /// Chunk sizes for binary COPY (0 = one unchunked load); defaults to the batch sizes
    #[arg(long, value_delimiter = ',')]
    pub copy_sizes: Option<Vec<usize>>,

    /// Points per packed blob row
    #[arg(long, value_delimiter = ',', default_values_t = crate::ingest::config::DEFAULT_GROUP_SIZES)]
    pub group_sizes: Vec<usize>,

    /// Rows per FETCH for the cursor read sweep; omitted skips the sweep
    #[arg(long, value_delimiter = ',')]
    pub fetch_sizes: Vec<usize>,

    /// Where the ingestion results CSV is written
    #[arg(long, short, default_value = "ingest_results.csv")]
    pub output: PathBuf,

    /// Where the cursor read results CSV is written
    #[arg(long, default_value = "read_results.csv")]
    pub read_output: PathBuf,

    /// Skip the stored-count check after each sample
    #[arg(long)]
    pub no_verify: bool,
}

impl Args {
    pub fn run_config(&self) -> Result<RunConfig, BenchError> {
        let mut builder = RunConfig::builder()
            .total_points(self.points)
            .attribute_count(self.attrs)
            .batch_sizes(self.batch_sizes.clone())
            .group_sizes(self.group_sizes.clone())
            .fetch_sizes(self.fetch_sizes.clone())
            .verify(!self.no_verify);
        if let Some(copy_sizes) = &self.copy_sizes {
            builder = builder.copy_sizes(copy_sizes.clone());
        }
        builder.build()
    }
}
