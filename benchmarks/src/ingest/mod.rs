//! Ingestion benchmark suite: strategies, the sweep driver and its report.

pub mod config;
pub mod error;
pub mod instrumentation;
pub mod mode;
pub mod partition;
pub mod runner;
pub mod workloads;

pub use config::{RunConfig, RunConfigBuilder};
pub use error::BenchError;
pub use instrumentation::{BenchResult, ModeDetail, ReadResult, Report};
pub use mode::Mode;
pub use partition::Partitions;
pub use runner::Runner;
