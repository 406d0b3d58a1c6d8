//! Common utilities for Postgres storage tests

use anyhow::Result;
use pgingest_storage_postgres::Postgres;
use std::{
    io,
    str::FromStr,
    sync::{Arc, Mutex},
};
use testcontainers::ContainerAsync;
use testcontainers_modules::{postgres, testcontainers::runners::AsyncRunner};
use tokio_postgres::Client;
use tracing::Level;

// Initialize tracing for tests
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

/// Opens a second, independent connection for inspecting table contents.
pub async fn inspect(database: &TestDatabase) -> Result<Client> {
    let (client, connection) = tokio_postgres::connect(&database.connection_string, tokio_postgres::NoTls).await?;
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            eprintln!("connection error: {}", e);
        }
    });
    Ok(client)
}

/// Log lines written while a `capture_logs` guard is alive on this thread.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String { String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned() }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

/// Routes this thread's DEBUG logs into a buffer until the guard drops.
pub fn capture_logs() -> (tracing::subscriber::DefaultGuard, LogBuffer) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt().with_max_level(Level::DEBUG).with_ansi(false).with_writer(move || writer.clone()).finish();
    (tracing::subscriber::set_default(subscriber), buffer)
}
