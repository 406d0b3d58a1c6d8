//! Core types for pgingest: synthetic point fixtures, the packed binary
//! payload codec, and the persistence traits implemented by storage backends.

pub mod codec;
pub mod error;
pub mod memory;
pub mod point;
pub mod storage;

pub use codec::PackedBlob;
pub use error::{PayloadError, StoreError};
pub use point::{FixtureGenerator, Point};
pub use storage::{PointSession, PointStore, Table};
