//! Common helpers for benchmarks.

pub mod postgres {
    use anyhow::Result;
    use pgingest_core::PointStore;
    use pgingest_storage_postgres::Postgres;
    use testcontainers::Container;
    use testcontainers_modules::{postgres as tc_postgres, testcontainers::runners::SyncRunner};

    /// Creates a Postgres test container and returns the connection string.
    pub fn create_container() -> Result<(Container<tc_postgres::Postgres>, String)> {
        let container = tc_postgres::Postgres::default().with_db_name("pgingest").with_user("postgres").with_password("postgres").start()?;

        let host = container.get_host()?;
        let port = container.get_host_port_ipv4(5432)?;
        let connection_string = format!("host={host} port={port} user=postgres password=postgres dbname=pgingest");

        Ok((container, connection_string))
    }

    /// Connects a single-connection store and creates the benchmark tables.
    pub async fn create_store(connection_string: &str) -> Result<Postgres> {
        let store = Postgres::connect(connection_string).await?;
        store.reset_schema().await?;
        Ok(store)
    }
}
