use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by a persistence backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("schema setup failed: {0}")]
    SchemaSetup(BoxError),
    #[error("persistence failure: {0}")]
    Persistence(BoxError),
    #[error("table {0} does not exist")]
    MissingTable(String),
}

impl StoreError {
    pub fn schema(err: impl Into<BoxError>) -> Self { StoreError::SchemaSetup(err.into()) }

    pub fn persistence(err: impl Into<BoxError>) -> Self { StoreError::Persistence(err.into()) }
}

/// Errors from packing or unpacking a binary point payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("malformed payload: {len} bytes is not a multiple of the {stride} byte point stride")]
    Malformed { len: usize, stride: usize },
    #[error("expected {expected} attributes per point, found {actual}")]
    AttributeCount { expected: usize, actual: usize },
    #[error("payload declares {expected} points but holds {actual}")]
    GroupSize { expected: usize, actual: usize },
    #[error("{0} does not fit in a payload header field")]
    TooLarge(usize),
    #[error("payload header {field} is negative: {value}")]
    NegativeHeader { field: &'static str, value: i32 },
}
