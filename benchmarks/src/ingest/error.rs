use pgingest_core::{PayloadError, StoreError};
use thiserror::Error;

use crate::ingest::Mode;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("schema setup failed: {0}")]
    SchemaSetup(#[source] StoreError),

    /// A write failed mid-sweep. `committed` counts only points whose
    /// partitions finished before the failure.
    #[error("{mode} (size {size}) failed after {committed} committed points: {source}")]
    Persistence { mode: Mode, size: usize, committed: u64, source: StoreError },

    #[error("cursor read (fetch size {fetch_size}) failed: {source}")]
    Read { fetch_size: usize, source: StoreError },

    #[error("{mode} (size {size}) left {actual} points in the table, expected {expected}")]
    CountMismatch { mode: Mode, size: usize, expected: u64, actual: u64 },

    #[error("cursor read (fetch size {fetch_size}) returned {actual} rows, expected {expected}")]
    ReadMismatch { fetch_size: usize, expected: u64, actual: u64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    MalformedPayload(#[from] PayloadError),

    #[error("failed to write report: {0}")]
    Report(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Adapter for `map_err` on a strategy's store calls.
    pub fn persistence(mode: Mode, size: usize, committed: u64) -> impl FnOnce(StoreError) -> BenchError {
        move |source| BenchError::Persistence { mode, size, committed, source }
    }
}
