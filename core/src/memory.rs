//! In-process `PointStore` that keeps rows in vectors and records every
//! statement it would have issued. Used for dry runs of the harness and for
//! asserting statement shapes in tests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::{
    codec::PackedBlob,
    error::StoreError,
    point::Point,
    storage::{PointSession, PointStore, Table},
};

/// A statement as the memory store observed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    ResetSchema,
    Truncate(Table),
    /// A single-row insert inside a per-row transaction
    Insert,
    MultiInsert { rows: usize },
    Copy { rows: usize },
    BlobInsert { group_size: i32, attribute_count: i32, payload_len: usize },
    /// End of a transaction that made `rows` points durable
    Commit { rows: usize },
    Fetch { rows: usize },
}

#[derive(Debug, Default)]
struct MemoryState {
    schema_ready: bool,
    points: Vec<Point>,
    blobs: Vec<PackedBlob>,
    log: Vec<Statement>,
    writes: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    fail_schema: bool,
    fail_after: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Makes `reset_schema` fail.
    pub fn failing_schema() -> Self { Self { fail_schema: true, ..Self::default() } }

    /// Lets `writes` write statements succeed, then fails every later one.
    pub fn failing_after(writes: usize) -> Self { Self { fail_after: Some(writes), ..Self::default() } }

    fn state(&self) -> MutexGuard<'_, MemoryState> { self.state.lock().unwrap_or_else(PoisonError::into_inner) }

    pub fn points(&self) -> Vec<Point> { self.state().points.clone() }

    pub fn blobs(&self) -> Vec<PackedBlob> { self.state().blobs.clone() }

    pub fn log(&self) -> Vec<Statement> { self.state().log.clone() }

    pub fn clear_log(&self) { self.state().log.clear(); }
}

impl MemoryState {
    fn require_schema(&self, table: Table) -> Result<(), StoreError> {
        if self.schema_ready {
            Ok(())
        } else {
            Err(StoreError::MissingTable(table.name().to_owned()))
        }
    }

    /// Accounts for one write statement, failing once the injected budget is spent.
    fn write(&mut self, fail_after: Option<usize>, statement: Statement) -> Result<(), StoreError> {
        if let Some(limit) = fail_after {
            if self.writes >= limit {
                return Err(StoreError::persistence(format!("injected failure after {limit} writes")));
            }
        }
        self.writes += 1;
        self.log.push(statement);
        Ok(())
    }
}

#[async_trait]
impl PointStore for MemoryStore {
    async fn reset_schema(&self) -> Result<(), StoreError> {
        if self.fail_schema {
            return Err(StoreError::schema("schema reset rejected"));
        }
        let mut state = self.state();
        state.points.clear();
        state.blobs.clear();
        state.schema_ready = true;
        state.log.push(Statement::ResetSchema);
        Ok(())
    }

    async fn session<'a>(&'a self) -> Result<Box<dyn PointSession + 'a>, StoreError> { Ok(Box::new(MemorySession { store: self })) }

    fn identifier(&self) -> String { "memory".to_string() }
}

pub struct MemorySession<'a> {
    store: &'a MemoryStore,
}

#[async_trait]
impl<'a> PointSession for MemorySession<'a> {
    async fn clear(&mut self, table: Table) -> Result<(), StoreError> {
        let mut state = self.store.state();
        state.require_schema(table)?;
        match table {
            Table::Points => state.points.clear(),
            Table::Blobs => state.blobs.clear(),
        }
        state.log.push(Statement::Truncate(table));
        Ok(())
    }

    async fn insert_each(&mut self, points: &[Point]) -> Result<u64, StoreError> {
        let mut state = self.store.state();
        state.require_schema(Table::Points)?;
        let mut staged = Vec::with_capacity(points.len());
        for point in points {
            state.write(self.store.fail_after, Statement::Insert)?;
            staged.push(point.clone());
        }
        state.points.extend(staged);
        state.log.push(Statement::Commit { rows: points.len() });
        Ok(points.len() as u64)
    }

    async fn insert_batch(&mut self, points: &[Point]) -> Result<u64, StoreError> {
        let mut state = self.store.state();
        state.require_schema(Table::Points)?;
        state.write(self.store.fail_after, Statement::MultiInsert { rows: points.len() })?;
        state.points.extend_from_slice(points);
        state.log.push(Statement::Commit { rows: points.len() });
        Ok(points.len() as u64)
    }

    async fn copy_in(&mut self, points: &mut (dyn Iterator<Item = Point> + Send)) -> Result<u64, StoreError> {
        let mut state = self.store.state();
        state.require_schema(Table::Points)?;
        let staged: Vec<Point> = points.collect();
        state.write(self.store.fail_after, Statement::Copy { rows: staged.len() })?;
        let rows = staged.len();
        state.points.extend(staged);
        debug!("MemoryStore.copy_in: {} rows", rows);
        Ok(rows as u64)
    }

    async fn insert_blob(&mut self, blob: &PackedBlob) -> Result<u64, StoreError> {
        let mut state = self.store.state();
        state.require_schema(Table::Blobs)?;
        let statement =
            Statement::BlobInsert { group_size: blob.group_size, attribute_count: blob.attribute_count, payload_len: blob.len() };
        state.write(self.store.fail_after, statement)?;
        state.blobs.push(blob.clone());
        state.log.push(Statement::Commit { rows: blob.group_size as usize });
        Ok(blob.group_size as u64)
    }

    async fn scan(&mut self, fetch_size: usize) -> Result<u64, StoreError> {
        if fetch_size == 0 {
            return Err(StoreError::persistence("fetch size must be at least 1"));
        }
        let mut state = self.store.state();
        state.require_schema(Table::Points)?;
        let pages: Vec<usize> = state.points.chunks(fetch_size).map(|page| page.len()).collect();
        let mut rows = 0;
        for page in pages {
            state.log.push(Statement::Fetch { rows: page });
            rows += page as u64;
        }
        state.log.push(Statement::Fetch { rows: 0 });
        Ok(rows)
    }

    async fn stored_points(&mut self, table: Table) -> Result<u64, StoreError> {
        let state = self.store.state();
        state.require_schema(table)?;
        Ok(match table {
            Table::Points => state.points.len() as u64,
            Table::Blobs => state.blobs.iter().map(|blob| blob.group_size as u64).sum(),
        })
    }
}
