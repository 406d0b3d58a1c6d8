use async_trait::async_trait;
use bb8::PooledConnection;
use bb8_postgres::{tokio_postgres::NoTls, PostgresConnectionManager};
use futures_util::pin_mut;
use tokio_postgres::{binary_copy::BinaryCopyInWriter, error::SqlState};
use tracing::{debug, error, info};

use pgingest_core::{
    storage::{BLOB_TABLE, POINTS_TABLE},
    PackedBlob, Point, PointSession, PointStore, StoreError, Table,
};

pub mod sql_builder;
pub mod value;

use sql_builder::SqlBuilder;
use value::{point_from_row, point_values, POINT_COLUMNS, POINT_TYPES};

pub type PostgresPool = bb8::Pool<PostgresConnectionManager<NoTls>>;

const CURSOR_NAME: &str = "point_cursor";

pub struct Postgres {
    pool: PostgresPool,
}

impl Postgres {
    pub fn new(pool: PostgresPool) -> anyhow::Result<Self> { Ok(Self { pool }) }

    /// Builds a pool holding a single connection, so every session of a run
    /// reuses the same backend.
    pub async fn connect(connection_string: &str) -> anyhow::Result<Self> {
        let manager = PostgresConnectionManager::new_from_stringlike(connection_string, NoTls)?;
        let pool = bb8::Pool::builder().max_size(1).build(manager).await?;
        Self::new(pool)
    }

    fn schema_sql() -> String {
        format!(
            r#"DROP TABLE IF EXISTS "{points}";
            DROP TABLE IF EXISTS "{blobs}";
            CREATE TABLE "{points}"(
                "id" bigserial PRIMARY KEY,
                "x" float8 NOT NULL,
                "y" float8 NOT NULL,
                "z" float8 NOT NULL,
                "attrs" float8[] NOT NULL
            );
            CREATE TABLE "{blobs}"(
                "id" bigserial PRIMARY KEY,
                "group_size" int4 NOT NULL,
                "attr_count" int4 NOT NULL,
                "payload" bytea NOT NULL
            );"#,
            points = POINTS_TABLE,
            blobs = BLOB_TABLE,
        )
    }
}

#[async_trait]
impl PointStore for Postgres {
    async fn reset_schema(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await.map_err(StoreError::schema)?;
        let schema = Self::schema_sql();
        debug!("Postgres.reset_schema: {schema}");
        if let Err(err) = client.batch_execute(&schema).await {
            error!("Postgres.reset_schema: {}", err);
            return Err(StoreError::schema(err));
        }
        info!("Postgres: recreated {} and {}", POINTS_TABLE, BLOB_TABLE);
        Ok(())
    }

    async fn session<'a>(&'a self) -> Result<Box<dyn PointSession + 'a>, StoreError> {
        let client = self.pool.get().await.map_err(StoreError::persistence)?;
        Ok(Box::new(PostgresSession { client }))
    }

    fn identifier(&self) -> String { "postgres".to_string() }
}

/// Holds the pooled connection for the duration of one strategy run.
pub struct PostgresSession<'a> {
    client: PooledConnection<'a, PostgresConnectionManager<NoTls>>,
}

#[async_trait]
impl<'a> PointSession for PostgresSession<'a> {
    async fn clear(&mut self, table: Table) -> Result<(), StoreError> {
        let query = format!(r#"TRUNCATE "{}" RESTART IDENTITY"#, table.name());
        debug!("PostgresSession.clear: {query}");
        self.client.batch_execute(&query).await.map_err(store_error)
    }

    async fn insert_each(&mut self, points: &[Point]) -> Result<u64, StoreError> {
        let query = format!(r#"INSERT INTO "{}"("x", "y", "z", "attrs") VALUES($1, $2, $3, $4)"#, POINTS_TABLE);
        debug!("PostgresSession.insert_each: {} x {query}", points.len());

        let trx = self.client.transaction().await.map_err(store_error)?;
        let statement = trx.prepare(&query).await.map_err(store_error)?;
        for point in points {
            trx.execute(&statement, &[&point.x, &point.y, &point.z, &point.attrs]).await.map_err(store_error)?;
        }
        trx.commit().await.map_err(store_error)?;

        Ok(points.len() as u64)
    }

    async fn insert_batch(&mut self, points: &[Point]) -> Result<u64, StoreError> {
        let mut sql = SqlBuilder::with_fields(POINT_COLUMNS.to_vec());
        sql.table_name(POINTS_TABLE);
        for point in points {
            sql.values_row(point_values(point)).map_err(StoreError::persistence)?;
        }
        let (query, args) = sql.build_insert().map_err(StoreError::persistence)?;
        debug!("PostgresSession.insert_batch: {} rows, {} parameters: {query}", points.len(), args.len());

        let trx = self.client.transaction().await.map_err(store_error)?;
        let affected = trx.execute_raw(query.as_str(), args).await.map_err(store_error)?;
        trx.commit().await.map_err(store_error)?;

        Ok(affected)
    }

    async fn copy_in(&mut self, points: &mut (dyn Iterator<Item = Point> + Send)) -> Result<u64, StoreError> {
        let query = format!(r#"COPY "{}" ("x", "y", "z", "attrs") FROM STDIN (FORMAT binary)"#, POINTS_TABLE);
        debug!("PostgresSession.copy_in: {query}");

        let sink = self.client.copy_in(query.as_str()).await.map_err(store_error)?;
        let writer = BinaryCopyInWriter::new(sink, &POINT_TYPES);
        pin_mut!(writer);
        for point in points {
            writer.as_mut().write(&[&point.x, &point.y, &point.z, &point.attrs]).await.map_err(store_error)?;
        }
        writer.finish().await.map_err(store_error)
    }

    async fn insert_blob(&mut self, blob: &PackedBlob) -> Result<u64, StoreError> {
        let query = format!(r#"INSERT INTO "{}"("group_size", "attr_count", "payload") VALUES($1, $2, $3)"#, BLOB_TABLE);
        let payload: &[u8] = &blob.payload;
        debug!("PostgresSession.insert_blob: {query} ({} points, {} bytes)", blob.group_size, payload.len());

        let trx = self.client.transaction().await.map_err(store_error)?;
        trx.execute(query.as_str(), &[&blob.group_size, &blob.attribute_count, &payload]).await.map_err(store_error)?;
        trx.commit().await.map_err(store_error)?;

        Ok(blob.group_size as u64)
    }

    async fn scan(&mut self, fetch_size: usize) -> Result<u64, StoreError> {
        if fetch_size == 0 {
            return Err(StoreError::persistence("fetch size must be at least 1"));
        }
        let declare = format!(
            r#"DECLARE "{}" NO SCROLL CURSOR FOR SELECT "id", "x", "y", "z", "attrs" FROM "{}" ORDER BY "id""#,
            CURSOR_NAME, POINTS_TABLE
        );
        let fetch = format!(r#"FETCH FORWARD {} FROM "{}""#, fetch_size, CURSOR_NAME);
        let close = format!(r#"CLOSE "{}""#, CURSOR_NAME);

        // cursors only live inside a transaction
        let trx = self.client.transaction().await.map_err(store_error)?;
        debug!("PostgresSession.scan: {declare}");
        trx.batch_execute(&declare).await.map_err(store_error)?;

        let mut rows = 0u64;
        loop {
            debug!("PostgresSession.scan: {fetch}");
            let page = trx.query(fetch.as_str(), &[]).await.map_err(store_error)?;
            if page.is_empty() {
                break;
            }
            for row in &page {
                point_from_row(row).map_err(StoreError::persistence)?;
                rows += 1;
            }
        }

        debug!("PostgresSession.scan: {close}");
        trx.batch_execute(&close).await.map_err(store_error)?;
        trx.commit().await.map_err(store_error)?;
        Ok(rows)
    }

    async fn stored_points(&mut self, table: Table) -> Result<u64, StoreError> {
        let query = match table {
            Table::Points => format!(r#"SELECT COUNT(*) FROM "{}""#, table.name()),
            Table::Blobs => format!(r#"SELECT COALESCE(SUM("group_size"), 0)::int8 FROM "{}""#, table.name()),
        };
        debug!("PostgresSession.stored_points: {query}");
        let row = self.client.query_one(query.as_str(), &[]).await.map_err(store_error)?;
        let count: i64 = row.try_get(0).map_err(StoreError::persistence)?;
        Ok(count as u64)
    }
}

fn store_error(err: tokio_postgres::Error) -> StoreError {
    match error_kind(&err) {
        ErrorKind::UndefinedTable { table } => StoreError::MissingTable(table),
        kind => {
            error!("postgres error ({:?}): {}", kind, err);
            StoreError::persistence(err)
        }
    }
}

// rust-postgres doesn't expose a structured error kind, so derive one from the SQLSTATE
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorKind {
    UndefinedTable { table: String },
    ProgramLimitExceeded,
    ConnectionClosed,
    Unknown,
}

pub fn error_kind(err: &tokio_postgres::Error) -> ErrorKind {
    if err.is_closed() {
        return ErrorKind::ConnectionClosed;
    }

    let sql_code = err.code().cloned();
    match sql_code {
        Some(SqlState::UNDEFINED_TABLE) => {
            // relation "benchmark_points" does not exist
            let message = err.as_db_error().map(|db_error| db_error.message().to_owned()).unwrap_or_else(|| err.to_string());
            ErrorKind::UndefinedTable { table: first_quoted(&message).unwrap_or_default().to_owned() }
        }
        Some(SqlState::PROGRAM_LIMIT_EXCEEDED) => ErrorKind::ProgramLimitExceeded,
        _ => ErrorKind::Unknown,
    }
}

fn first_quoted(message: &str) -> Option<&str> {
    let start = message.find('"')? + 1;
    let end = start + message[start..].find('"')?;
    Some(&message[start..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_quoted() {
        assert_eq!(first_quoted(r#"relation "benchmark_points" does not exist"#), Some("benchmark_points"));
        assert_eq!(first_quoted("no quotes here"), None);
        assert_eq!(first_quoted(r#"dangling "quote"#), None);
    }

    #[test]
    fn test_schema_sql_names_both_tables() {
        let schema = Postgres::schema_sql();
        assert!(schema.contains(r#"CREATE TABLE "benchmark_points"("#));
        assert!(schema.contains(r#"CREATE TABLE "benchmark_points_blob"("#));
        assert!(schema.contains(r#""attrs" float8[] NOT NULL"#));
        assert!(schema.contains(r#""payload" bytea NOT NULL"#));
    }
}
