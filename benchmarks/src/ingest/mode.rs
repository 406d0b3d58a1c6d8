use pgingest_core::Table;

/// The four ingestion strategies, in the order the driver sweeps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// One INSERT per point, `size` points per transaction
    PerRow,
    /// One multi-row INSERT of `size` points per transaction
    MultiRow,
    /// Binary COPY, `size` points per load (0 = a single load)
    BinaryBulk,
    /// One row per `size` points, packed into a bytea payload
    PackedBlob,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::PerRow, Mode::MultiRow, Mode::BinaryBulk, Mode::PackedBlob];

    pub fn name(&self) -> &'static str {
        match self {
            Mode::PerRow => "per-row",
            Mode::MultiRow => "multi-row",
            Mode::BinaryBulk => "binary-copy",
            Mode::PackedBlob => "packed-blob",
        }
    }

    pub fn table(&self) -> Table {
        match self {
            Mode::PackedBlob => Table::Blobs,
            _ => Table::Points,
        }
    }

    /// Whether a size of 0 is meaningful (an unchunked load).
    pub fn allows_unchunked(&self) -> bool { matches!(self, Mode::BinaryBulk) }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { f.write_str(self.name()) }
}
