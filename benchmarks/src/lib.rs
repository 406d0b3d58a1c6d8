//! pgingest benchmark harness.
//!
//! Measures point ingestion into Postgres under four strategies (per-row
//! INSERT, multi-row INSERT, binary COPY, packed blobs) and cursor-paginated
//! reads, sweeping batch/group/fetch sizes.

pub mod cli;
pub mod ingest;
