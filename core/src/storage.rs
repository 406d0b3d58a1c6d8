use async_trait::async_trait;

use crate::{codec::PackedBlob, error::StoreError, point::Point};

pub const POINTS_TABLE: &str = "benchmark_points";
pub const BLOB_TABLE: &str = "benchmark_points_blob";

/// The two tables ingestion strategies write into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    /// One row per point: `benchmark_points(id, x, y, z, attrs)`
    Points,
    /// One row per packed group: `benchmark_points_blob(id, group_size, attr_count, payload)`
    Blobs,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Points => POINTS_TABLE,
            Table::Blobs => BLOB_TABLE,
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}

#[async_trait]
pub trait PointStore: Send + Sync {
    /// Drops and recreates both benchmark tables.
    async fn reset_schema(&self) -> Result<(), StoreError>;

    /// Acquires the connection used for one strategy run. It is released when the
    /// returned session is dropped, whichever way the run exits.
    async fn session<'a>(&'a self) -> Result<Box<dyn PointSession + 'a>, StoreError>;

    /// Human-readable backend name for reports (e.g. "postgres", "memory").
    fn identifier(&self) -> String;
}

/// Persistence primitives available to a strategy while it holds a connection.
///
/// Every write returns the number of points it made durable.
#[async_trait]
pub trait PointSession: Send {
    /// Removes all rows from `table` and restarts its id sequence.
    async fn clear(&mut self, table: Table) -> Result<(), StoreError>;

    /// One transaction containing one single-row INSERT per point.
    async fn insert_each(&mut self, points: &[Point]) -> Result<u64, StoreError>;

    /// One transaction containing a single multi-row INSERT of all points.
    async fn insert_batch(&mut self, points: &[Point]) -> Result<u64, StoreError>;

    /// One binary bulk load streaming every point the iterator yields.
    async fn copy_in(&mut self, points: &mut (dyn Iterator<Item = Point> + Send)) -> Result<u64, StoreError>;

    /// One transaction inserting a single packed-blob row.
    async fn insert_blob(&mut self, blob: &PackedBlob) -> Result<u64, StoreError>;

    /// Reads every row of the points table through a forward-only cursor,
    /// `fetch_size` rows per round trip. Returns the number of rows read.
    async fn scan(&mut self, fetch_size: usize) -> Result<u64, StoreError>;

    /// Number of points held in `table`; for blobs this is the sum of group sizes.
    async fn stored_points(&mut self, table: Table) -> Result<u64, StoreError>;
}
