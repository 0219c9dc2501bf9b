//! Emulator capability interface
//!
//! Each emulation core implements [`EmulatorCore`] to expose stepping,
//! resets, work RAM inspection and state serialization. The harness never
//! talks to a core directly; it goes through [`EmulatorInstance`], which
//! applies the console switch policy and keeps state sizes fresh.

mod instance;
mod reference;

pub use instance::{EmulatorInstance, StateSizes};
pub use reference::ReferenceCore;

use crate::hash::{Fingerprint, fingerprint};
use crate::input::InputFrame;
use crate::state::{StateBlockSet, StateError, StateReader, StateWriter};

/// Core-level failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("ROM rejected by {core}: {reason}")]
    RomRejected { core: String, reason: String },
}

/// Trait implemented by each emulation core
pub trait EmulatorCore {
    /// Core name for reporting
    fn name(&self) -> &str;

    /// Load a ROM image and hard-reset the machine
    fn load_rom(&mut self, rom: &[u8]) -> Result<(), CoreError>;

    /// Run one step with the given input
    ///
    /// Console switches that need host policy (power, reset) have already
    /// been handled by the caller.
    fn advance(&mut self, frame: &InputFrame);

    /// Reset button
    fn soft_reset(&mut self);

    /// Power cycle
    fn hard_reset(&mut self);

    /// Read one byte of work RAM
    fn peek_work_ram(&self, address: usize) -> u8;

    fn state_blocks(&self) -> &StateBlockSet;

    fn state_blocks_mut(&mut self) -> &mut StateBlockSet;

    /// Full snapshot size for the current block set
    fn state_size(&self) -> usize;

    /// Fixed part of a differential snapshot for the current block set
    ///
    /// Covers contiguous blocks plus one header per differential block;
    /// changed bytes come on top of this.
    fn differential_state_size(&self) -> usize;

    fn serialize_state(&self, writer: &mut dyn StateWriter) -> Result<(), StateError>;

    fn deserialize_state(&mut self, reader: &mut dyn StateReader) -> Result<(), StateError>;

    /// Hash of the work RAM window
    fn fingerprint(&self) -> Fingerprint {
        fingerprint(|address| self.peek_work_ram(address))
    }
}
