//! Emulator state serialization
//!
//! Cores write their state through a [`StateWriter`] and read it back through a
//! [`StateReader`]. Each push is tagged as either contiguous (always stored
//! raw) or differential (stored as changes against a baseline when the
//! differential encoding is in use).
//!
//! # Encodings
//!
//! - **Contiguous** ([`ContiguousWriter`], [`ContiguousReader`]): a full
//!   snapshot of exactly `state_size()` bytes.
//! - **Differential** ([`DifferentialWriter`], [`DifferentialReader`]): raw
//!   contiguous blocks plus, for every differential block, an 8-byte header
//!   followed by run records (optionally LZ4 compressed):
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Differential block                       │
//! │ ├─ payload_len: u32                      │
//! │ ├─ raw_len: u32                          │
//! │ └─ payload: runs (LZ4 block if enabled)  │
//! │     ├─ offset: u32                       │
//! │     ├─ len: u32                          │
//! │     └─ bytes: [u8; len]                  │
//! └──────────────────────────────────────────┘
//! ```

mod blocks;
mod codec;
mod contiguous;
mod differential;

pub use blocks::{BlockError, StateBlockSet};
pub use codec::{CodecKind, DifferentialSettings, StateCodec};
pub use contiguous::{ContiguousReader, ContiguousWriter};
pub use differential::{DiffScratch, DifferentialReader, DifferentialWriter};

/// Header bytes in front of every differential block
pub const DIFFERENTIAL_BLOCK_HEADER: usize = 8;

/// Header bytes in front of every run record
pub(crate) const RUN_HEADER: usize = 8;

/// Sink for a core's serialized state
pub trait StateWriter {
    /// Store bytes verbatim
    fn push_contiguous(&mut self, data: &[u8]) -> Result<(), StateError>;

    /// Store bytes that are expected to change little between snapshots
    ///
    /// Encodings without a baseline store these verbatim.
    fn push_differential(&mut self, data: &[u8]) -> Result<(), StateError> {
        self.push_contiguous(data)
    }

    /// Bytes written so far
    fn output_size(&self) -> usize;
}

/// Source for a core's serialized state
pub trait StateReader {
    /// Fill `out` with bytes stored by [`StateWriter::push_contiguous`]
    fn pop_contiguous(&mut self, out: &mut [u8]) -> Result<(), StateError>;

    /// Fill `out` with bytes stored by [`StateWriter::push_differential`]
    fn pop_differential(&mut self, out: &mut [u8]) -> Result<(), StateError> {
        self.pop_contiguous(out)
    }

    /// Bytes consumed so far
    fn input_size(&self) -> usize;
}

/// State serialization errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// The destination buffer cannot hold the encoded state
    #[error("state buffer too small: {required} bytes required, capacity is {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    /// More bytes changed than the differential budget allows
    #[error("differential budget exceeded: {differences} differences, maximum is {max}")]
    DifferenceBudgetExceeded { differences: usize, max: usize },

    /// The source buffer ended before the core finished reading
    #[error("state buffer truncated: {required} bytes required, {available} available")]
    Truncated { required: usize, available: usize },

    /// The baseline does not cover the block being encoded
    #[error("baseline too short: block ends at {end}, baseline is {len} bytes")]
    BaselineMismatch { end: usize, len: usize },

    /// A full snapshot did not match the size the core reported
    #[error("state size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Differential data is not well formed
    #[error("corrupt differential data: {0}")]
    Corrupt(String),
}
