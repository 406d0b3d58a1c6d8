//! Containerized Postgres for end-to-end runs of the harness.

use anyhow::Result;
use pgingest_storage_postgres::Postgres;
use std::str::FromStr;
use testcontainers::ContainerAsync;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};
use tokio_postgres::Client;
use tracing::Level;

#[ctor::ctor]
fn init_tracing() {
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

pub struct TestDatabase {
    pub container: ContainerAsync<postgres::Postgres>,
    pub connection_string: String,
}

pub async fn create_postgres_container() -> Result<(TestDatabase, Postgres)> {
    let container: ContainerAsync<postgres::Postgres> =
        postgres::Postgres::default().with_db_name("pgingest").with_user("postgres").with_password("postgres").start().await?;

    let host = container.get_host().await?;
    let port = container.get_host_port_ipv4(5432).await?;
    let connection_string = format!("host={host} port={port} user=postgres password=postgres dbname=pgingest");
    let store = Postgres::connect(&connection_string).await?;

    Ok((TestDatabase { container, connection_string }, store))
}

pub async fn inspect(database: &TestDatabase) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(&database.connection_string, tokio_postgres::NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {}", e);
        }
    });
    Ok(client)
}
