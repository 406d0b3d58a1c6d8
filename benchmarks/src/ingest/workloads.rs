//! The ingestion strategies and the cursor read.
//!
//! Each strategy times only its partition work; truncation and verification
//! happen outside, in the runner. Points are counted only once the call that
//! persisted them returned, so a failure never reports a partition twice.

use pgingest_core::{FixtureGenerator, PackedBlob, Point, PointSession};
use std::time::Duration;

use crate::ingest::{BenchError, Mode, Partitions, instrumentation::PhaseTimer};

/// What one strategy or read run measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub elapsed: Duration,
    /// Points persisted (or rows read)
    pub points: u64,
    /// Encoded payload bytes written; only the packed-blob strategy produces any
    pub payload_bytes: u64,
}

/// Runs `mode` once, inserting `total_points` fixtures in partitions of `size`.
pub async fn ingest(
    mode: Mode,
    session: &mut (dyn PointSession + '_),
    total_points: u64,
    attribute_count: usize,
    size: usize,
) -> Result<Outcome, BenchError> {
    let generator = FixtureGenerator::new(attribute_count);
    match mode {
        Mode::PerRow => per_row(session, &generator, total_points, size).await,
        Mode::MultiRow => multi_row(session, &generator, total_points, size).await,
        Mode::BinaryBulk => binary_bulk(session, &generator, total_points, size).await,
        Mode::PackedBlob => packed_blob(session, &generator, total_points, size).await,
    }
}

/// `size` single-row INSERTs per transaction.
pub async fn per_row(
    session: &mut (dyn PointSession + '_),
    generator: &FixtureGenerator,
    total_points: u64,
    size: usize,
) -> Result<Outcome, BenchError> {
    let mut batch: Vec<Point> = Vec::with_capacity(batch_capacity(total_points, size));
    let timer = PhaseTimer::start();
    let mut inserted = 0u64;
    for range in Partitions::new(total_points, size) {
        batch.clear();
        batch.extend(generator.points(range));
        let written = session.insert_each(&batch).await.map_err(BenchError::persistence(Mode::PerRow, size, inserted))?;
        inserted += written;
    }
    Ok(Outcome { elapsed: timer.elapsed(), points: inserted, payload_bytes: 0 })
}

/// One multi-row INSERT of `size` points per transaction.
pub async fn multi_row(
    session: &mut (dyn PointSession + '_),
    generator: &FixtureGenerator,
    total_points: u64,
    size: usize,
) -> Result<Outcome, BenchError> {
    let mut batch: Vec<Point> = Vec::with_capacity(batch_capacity(total_points, size));
    let timer = PhaseTimer::start();
    let mut inserted = 0u64;
    for range in Partitions::new(total_points, size) {
        batch.clear();
        batch.extend(generator.points(range));
        let written = session.insert_batch(&batch).await.map_err(BenchError::persistence(Mode::MultiRow, size, inserted))?;
        inserted += written;
    }
    Ok(Outcome { elapsed: timer.elapsed(), points: inserted, payload_bytes: 0 })
}

/// Binary COPY streaming fixtures straight from the generator, one load per
/// `size` points (a single load when `size` is 0).
pub async fn binary_bulk(
    session: &mut (dyn PointSession + '_),
    generator: &FixtureGenerator,
    total_points: u64,
    size: usize,
) -> Result<Outcome, BenchError> {
    let timer = PhaseTimer::start();
    let mut inserted = 0u64;
    for range in Partitions::new(total_points, size) {
        let mut points = generator.points(range);
        let written = session.copy_in(&mut points).await.map_err(BenchError::persistence(Mode::BinaryBulk, size, inserted))?;
        inserted += written;
    }
    Ok(Outcome { elapsed: timer.elapsed(), points: inserted, payload_bytes: 0 })
}

/// One blob row of `size` packed points per transaction.
pub async fn packed_blob(
    session: &mut (dyn PointSession + '_),
    generator: &FixtureGenerator,
    total_points: u64,
    size: usize,
) -> Result<Outcome, BenchError> {
    let mut batch: Vec<Point> = Vec::with_capacity(batch_capacity(total_points, size));
    let timer = PhaseTimer::start();
    let mut inserted = 0u64;
    let mut payload_bytes = 0u64;
    for range in Partitions::new(total_points, size) {
        batch.clear();
        batch.extend(generator.points(range));
        let blob = PackedBlob::pack(&batch, generator.attribute_count())?;
        let written = session.insert_blob(&blob).await.map_err(BenchError::persistence(Mode::PackedBlob, size, inserted))?;
        inserted += written;
        payload_bytes += blob.len() as u64;
    }
    Ok(Outcome { elapsed: timer.elapsed(), points: inserted, payload_bytes })
}

/// Reads the whole points table through a cursor, `fetch_size` rows per FETCH.
pub async fn cursor_read(session: &mut (dyn PointSession + '_), fetch_size: usize) -> Result<Outcome, BenchError> {
    let timer = PhaseTimer::start();
    let rows = session.scan(fetch_size).await.map_err(|source| BenchError::Read { fetch_size, source })?;
    Ok(Outcome { elapsed: timer.elapsed(), points: rows, payload_bytes: 0 })
}

fn batch_capacity(total_points: u64, size: usize) -> usize { total_points.min(size as u64) as usize }
