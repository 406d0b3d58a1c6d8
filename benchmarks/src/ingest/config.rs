//! Run parameters for an ingestion sweep.

use crate::ingest::{BenchError, Mode};

pub const DEFAULT_TOTAL_POINTS: u64 = 100_000;
pub const DEFAULT_ATTRIBUTE_COUNT: usize = 8;
pub const DEFAULT_BATCH_SIZES: [usize; 4] = [1, 10, 100, 1000];
pub const DEFAULT_GROUP_SIZES: [usize; 4] = [1, 10, 100, 1000];

/// Immutable description of one benchmark run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Points each strategy/size sample inserts
    pub total_points: u64,

    /// Attributes generated per point
    pub attribute_count: usize,

    /// Sizes swept by the per-row and multi-row strategies (and binary COPY unless overridden)
    pub batch_sizes: Vec<usize>,

    /// Chunk sizes for binary COPY; 0 means one unchunked load. Falls back to `batch_sizes`.
    pub copy_sizes: Option<Vec<usize>>,

    /// Points per blob row for the packed-blob strategy
    pub group_sizes: Vec<usize>,

    /// Rows per FETCH for the cursor read sweep; empty skips the read sweep
    pub fetch_sizes: Vec<usize>,

    /// Check the stored point count after every sample
    pub verify: bool,
}

impl RunConfig {
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder {
            total_points: DEFAULT_TOTAL_POINTS,
            attribute_count: DEFAULT_ATTRIBUTE_COUNT,
            batch_sizes: DEFAULT_BATCH_SIZES.to_vec(),
            copy_sizes: None,
            group_sizes: DEFAULT_GROUP_SIZES.to_vec(),
            fetch_sizes: Vec::new(),
            verify: true,
        }
    }

    /// The sizes swept for `mode`, in configured order.
    pub fn sizes(&self, mode: Mode) -> &[usize] {
        match mode {
            Mode::PerRow | Mode::MultiRow => &self.batch_sizes,
            Mode::BinaryBulk => self.copy_sizes.as_deref().unwrap_or(&self.batch_sizes),
            Mode::PackedBlob => &self.group_sizes,
        }
    }

    pub fn validate(&self) -> Result<(), BenchError> {
        for mode in Mode::ALL {
            if !mode.allows_unchunked() && self.sizes(mode).contains(&0) {
                return Err(BenchError::InvalidConfig(format!("{mode} sizes must be at least 1")));
            }
        }
        if self.fetch_sizes.contains(&0) {
            return Err(BenchError::InvalidConfig("fetch sizes must be at least 1".to_string()));
        }
        if i32::try_from(self.attribute_count).is_err() {
            return Err(BenchError::InvalidConfig(format!("attribute count {} is too large", self.attribute_count)));
        }
        Ok(())
    }
}

/// Builder for RunConfig with sensible defaults.
#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    total_points: u64,
    attribute_count: usize,
    batch_sizes: Vec<usize>,
    copy_sizes: Option<Vec<usize>>,
    group_sizes: Vec<usize>,
    fetch_sizes: Vec<usize>,
    verify: bool,
}

impl RunConfigBuilder {
    pub fn total_points(mut self, count: u64) -> Self {
        self.total_points = count;
        self
    }

    pub fn attribute_count(mut self, count: usize) -> Self {
        self.attribute_count = count;
        self
    }

    pub fn batch_sizes(mut self, sizes: impl Into<Vec<usize>>) -> Self {
        self.batch_sizes = sizes.into();
        self
    }

    pub fn copy_sizes(mut self, sizes: impl Into<Vec<usize>>) -> Self {
        self.copy_sizes = Some(sizes.into());
        self
    }

    pub fn group_sizes(mut self, sizes: impl Into<Vec<usize>>) -> Self {
        self.group_sizes = sizes.into();
        self
    }

    pub fn fetch_sizes(mut self, sizes: impl Into<Vec<usize>>) -> Self {
        self.fetch_sizes = sizes.into();
        self
    }

    pub fn verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn build(self) -> Result<RunConfig, BenchError> {
        let config = RunConfig {
            total_points: self.total_points,
            attribute_count: self.attribute_count,
            batch_sizes: self.batch_sizes,
            copy_sizes: self.copy_sizes,
            group_sizes: self.group_sizes,
            fetch_sizes: self.fetch_sizes,
            verify: self.verify,
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::builder().build().unwrap();
        assert_eq!(config.total_points, 100_000);
        assert_eq!(config.attribute_count, 8);
        assert_eq!(config.sizes(Mode::PerRow), &[1, 10, 100, 1000]);
        assert_eq!(config.sizes(Mode::BinaryBulk), &[1, 10, 100, 1000]);
        assert_eq!(config.sizes(Mode::PackedBlob), &[1, 10, 100, 1000]);
        assert!(config.fetch_sizes.is_empty());
        assert!(config.verify);
    }

    #[test]
    fn test_copy_sizes_override() {
        let config = RunConfig::builder().batch_sizes([5, 50]).copy_sizes([0, 500]).build().unwrap();
        assert_eq!(config.sizes(Mode::MultiRow), &[5, 50]);
        assert_eq!(config.sizes(Mode::BinaryBulk), &[0, 500]);
    }

    #[test]
    fn test_zero_sizes_rejected() {
        assert!(matches!(RunConfig::builder().batch_sizes([10, 0]).build(), Err(BenchError::InvalidConfig(_))));
        assert!(matches!(RunConfig::builder().group_sizes([0]).build(), Err(BenchError::InvalidConfig(_))));
        assert!(matches!(RunConfig::builder().fetch_sizes([0]).build(), Err(BenchError::InvalidConfig(_))));
    }
}
