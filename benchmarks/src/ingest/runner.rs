//! Sweep orchestration: schema reset, strategy x size samples, cursor reads.

use pgingest_core::{FixtureGenerator, PointStore, Table};
use tracing::{debug, info, warn};

use crate::ingest::{
    BenchError, BenchResult, Mode, ReadResult, Report, RunConfig,
    instrumentation::{PhaseTimer, ReportMetadata},
    workloads,
};

/// Orchestrates benchmark execution against one store.
pub struct Runner<S: PointStore> {
    store: S,
    config: RunConfig,
}

impl<S: PointStore> Runner<S> {
    /// Creates a new runner with the given store and configuration.
    pub fn new(store: S, config: RunConfig) -> Self { Self { store, config } }

    pub fn store(&self) -> &S { &self.store }

    pub fn config(&self) -> &RunConfig { &self.config }

    /// Drops and recreates the benchmark tables. Any failure here is fatal.
    pub async fn setup(&self) -> Result<(), BenchError> { self.store.reset_schema().await.map_err(BenchError::SchemaSetup) }

    /// Runs every strategy over its configured sizes, then the read sweep.
    /// The first failure aborts the run; no partial report is returned.
    pub async fn execute(&self) -> Result<Report, BenchError> {
        let timer = PhaseTimer::start();
        let mut report = Report::new(ReportMetadata {
            backend: self.store.identifier(),
            total_points: self.config.total_points,
            attribute_count: self.config.attribute_count,
        });

        for mode in Mode::ALL {
            for &size in self.config.sizes(mode) {
                report.add_result(self.sample(mode, size).await?);
            }
        }

        if !self.config.fetch_sizes.is_empty() {
            for read in self.read_sweep().await? {
                report.add_read(read);
            }
        }

        report.finalize(timer.elapsed());
        if let Some(fastest) = report.fastest() {
            info!("Runner: fastest {} size {} at {:.0} points/sec", fastest.mode(), fastest.size, fastest.throughput);
        }
        Ok(report)
    }

    pub async fn run(&self) -> Result<Report, BenchError> {
        self.setup().await?;
        self.execute().await
    }

    /// One strategy/size sample on a freshly truncated table.
    async fn sample(&self, mode: Mode, size: usize) -> Result<BenchResult, BenchError> {
        let total = self.config.total_points;
        let mut session = self.store.session().await.map_err(BenchError::persistence(mode, size, 0))?;
        session.clear(mode.table()).await.map_err(BenchError::persistence(mode, size, 0))?;

        debug!("Runner: {} size {} starting", mode, size);
        let outcome = workloads::ingest(mode, session.as_mut(), total, self.config.attribute_count, size).await?;

        if self.config.verify {
            let actual = session.stored_points(mode.table()).await.map_err(BenchError::persistence(mode, size, outcome.points))?;
            if actual != total {
                return Err(BenchError::CountMismatch { mode, size, expected: total, actual });
            }
        }

        let result = BenchResult::new(mode, size, &outcome);
        if result.elapsed.is_zero() && total > 0 {
            warn!("Runner: {} size {} finished in zero time; throughput reported as 0", mode, size);
        }
        info!(
            "Runner: {} size {}: {} points in {:.3}s ({:.0} points/sec)",
            mode,
            size,
            result.points,
            result.elapsed.as_secs_f64(),
            result.throughput
        );
        Ok(result)
    }

    /// Re-seeds the points table (untimed) and reads it back once per fetch size.
    async fn read_sweep(&self) -> Result<Vec<ReadResult>, BenchError> {
        let total = self.config.total_points;
        let seed_error = |source| BenchError::Persistence { mode: Mode::BinaryBulk, size: 0, committed: 0, source };

        let mut session = self.store.session().await.map_err(seed_error)?;
        session.clear(Table::Points).await.map_err(seed_error)?;
        let generator = FixtureGenerator::new(self.config.attribute_count);
        session.copy_in(&mut generator.points(0..total)).await.map_err(seed_error)?;
        debug!("Runner: seeded {} points for the read sweep", total);

        let mut reads = Vec::with_capacity(self.config.fetch_sizes.len());
        for &fetch_size in &self.config.fetch_sizes {
            let outcome = workloads::cursor_read(session.as_mut(), fetch_size).await?;
            if self.config.verify && outcome.points != total {
                return Err(BenchError::ReadMismatch { fetch_size, expected: total, actual: outcome.points });
            }
            let read = ReadResult::new(fetch_size, &outcome);
            info!(
                "Runner: cursor fetch {}: {} rows in {:.3}s ({:.0} rows/sec)",
                fetch_size,
                read.rows,
                read.elapsed.as_secs_f64(),
                read.throughput
            );
            reads.push(read);
        }
        Ok(reads)
    }
}
