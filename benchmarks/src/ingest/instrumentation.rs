//! Instrumentation and reporting for benchmark runs.

use serde::Serialize;
use std::{
    fs::File,
    io,
    path::Path,
    time::{Duration, Instant},
};

use crate::ingest::{BenchError, Mode, workloads::Outcome};

pub const RESULT_HEADER: [&str; 5] = ["Mode", "Size", "Seconds", "PointsPerSec", "AvgBytesPerPoint"];
pub const READ_HEADER: [&str; 4] = ["Mode", "FetchSize", "Seconds", "RowsPerSec"];

/// Items per second, 0 when nothing was processed or no time elapsed.
pub fn throughput(count: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.as_secs_f64();
    if count == 0 || seconds <= 0.0 { 0.0 } else { count as f64 / seconds }
}

/// Strategy-specific part of a result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModeDetail {
    PerRow,
    MultiRow,
    BinaryBulk,
    PackedBlob { avg_bytes_per_point: f64 },
}

impl ModeDetail {
    pub fn mode(&self) -> Mode {
        match self {
            ModeDetail::PerRow => Mode::PerRow,
            ModeDetail::MultiRow => Mode::MultiRow,
            ModeDetail::BinaryBulk => Mode::BinaryBulk,
            ModeDetail::PackedBlob { .. } => Mode::PackedBlob,
        }
    }

    pub fn avg_bytes_per_point(&self) -> Option<f64> {
        match self {
            ModeDetail::PackedBlob { avg_bytes_per_point } => Some(*avg_bytes_per_point),
            _ => None,
        }
    }
}

/// One strategy/size sample.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchResult {
    pub size: usize,
    pub elapsed: Duration,
    pub points: u64,
    pub throughput: f64,
    pub detail: ModeDetail,
}

impl BenchResult {
    pub fn new(mode: Mode, size: usize, outcome: &Outcome) -> Self {
        let detail = match mode {
            Mode::PerRow => ModeDetail::PerRow,
            Mode::MultiRow => ModeDetail::MultiRow,
            Mode::BinaryBulk => ModeDetail::BinaryBulk,
            Mode::PackedBlob => {
                let avg_bytes_per_point =
                    if outcome.points == 0 { 0.0 } else { outcome.payload_bytes as f64 / outcome.points as f64 };
                ModeDetail::PackedBlob { avg_bytes_per_point }
            }
        };
        Self { size, elapsed: outcome.elapsed, points: outcome.points, throughput: throughput(outcome.points, outcome.elapsed), detail }
    }

    pub fn mode(&self) -> Mode { self.detail.mode() }
}

/// One cursor read sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadResult {
    pub fetch_size: usize,
    pub elapsed: Duration,
    pub rows: u64,
    pub throughput: f64,
}

impl ReadResult {
    pub fn new(fetch_size: usize, outcome: &Outcome) -> Self {
        Self { fetch_size, elapsed: outcome.elapsed, rows: outcome.points, throughput: throughput(outcome.points, outcome.elapsed) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetadata {
    pub backend: String,
    pub total_points: u64,
    pub attribute_count: usize,
}

/// Ordered results of a run.
#[derive(Debug, Clone)]
pub struct Report {
    pub results: Vec<BenchResult>,
    pub reads: Vec<ReadResult>,
    pub total_duration: Duration,
    pub metadata: ReportMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResultRow {
    mode: &'static str,
    size: usize,
    seconds: String,
    points_per_sec: String,
    avg_bytes_per_point: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ReadRow {
    mode: &'static str,
    fetch_size: usize,
    seconds: String,
    rows_per_sec: String,
}

impl Report {
    pub fn new(metadata: ReportMetadata) -> Self {
        Self { results: Vec::new(), reads: Vec::new(), total_duration: Duration::ZERO, metadata }
    }

    pub fn add_result(&mut self, result: BenchResult) { self.results.push(result); }

    pub fn add_read(&mut self, read: ReadResult) { self.reads.push(read); }

    pub fn finalize(&mut self, total_duration: Duration) { self.total_duration = total_duration; }

    /// The highest-throughput result; ties go to the earliest.
    pub fn fastest(&self) -> Option<&BenchResult> {
        self.results.iter().fold(None, |best: Option<&BenchResult>, result| match best {
            Some(best) if best.throughput >= result.throughput => Some(best),
            _ => Some(result),
        })
    }

    /// Prints a concise table summary to stdout.
    pub fn print_summary(&self) {
        println!("\n=== Ingest Benchmark Report ===");
        println!("Backend: {}", self.metadata.backend);
        println!("Points: {}", self.metadata.total_points);
        println!("Attributes: {}", self.metadata.attribute_count);
        println!("\nIngest Results:");
        println!("{:<14} {:>8} {:>12} {:>15} {:>12}", "Mode", "Size", "Seconds", "Points/sec", "Bytes/point");
        println!("{}", "-".repeat(65));
        for result in &self.results {
            let avg = result.detail.avg_bytes_per_point().map(|avg| format!("{avg:.1}")).unwrap_or_default();
            println!(
                "{:<14} {:>8} {:>11.3}s {:>15.0} {:>12}",
                result.mode().name(),
                result.size,
                result.elapsed.as_secs_f64(),
                result.throughput,
                avg
            );
        }
        println!("{}", "-".repeat(65));
        if let Some(fastest) = self.fastest() {
            println!("Fastest: {} size {} ({:.0} points/sec)", fastest.mode(), fastest.size, fastest.throughput);
        }

        if !self.reads.is_empty() {
            println!("\nCursor Reads:");
            println!("{:<14} {:>8} {:>12} {:>15}", "Mode", "Fetch", "Seconds", "Rows/sec");
            println!("{}", "-".repeat(52));
            for read in &self.reads {
                println!("{:<14} {:>8} {:>11.3}s {:>15.0}", "cursor", read.fetch_size, read.elapsed.as_secs_f64(), read.throughput);
            }
        }
        println!("\nTotal: {:.3}s", self.total_duration.as_secs_f64());
        println!();
    }

    /// Writes the ingest results as CSV: one header row, one row per result.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), BenchError> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.write_record(RESULT_HEADER)?;
        for result in &self.results {
            writer.serialize(ResultRow {
                mode: result.mode().name(),
                size: result.size,
                seconds: format!("{:.3}", result.elapsed.as_secs_f64()),
                points_per_sec: format!("{:.0}", result.throughput),
                avg_bytes_per_point: result.detail.avg_bytes_per_point().map(|avg| format!("{avg:.1}")).unwrap_or_default(),
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_reads_csv<W: io::Write>(&self, writer: W) -> Result<(), BenchError> {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        writer.write_record(READ_HEADER)?;
        for read in &self.reads {
            writer.serialize(ReadRow {
                mode: "cursor",
                fetch_size: read.fetch_size,
                seconds: format!("{:.3}", read.elapsed.as_secs_f64()),
                rows_per_sec: format!("{:.0}", read.throughput),
            })?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), BenchError> { self.write_csv(File::create(path)?) }

    pub fn save_reads_csv(&self, path: impl AsRef<Path>) -> Result<(), BenchError> { self.write_reads_csv(File::create(path)?) }
}

/// Timer for measuring phase durations.
pub struct PhaseTimer {
    start: Instant,
}

impl PhaseTimer {
    pub fn start() -> Self { Self { start: Instant::now() } }

    pub fn elapsed(&self) -> Duration { self.start.elapsed() }
}
