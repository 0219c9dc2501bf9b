//! Shared wrapper around an emulation core

use tracing::debug;

use crate::error::ReplayError;
use crate::hash::Fingerprint;
use crate::input::{ControllerParser, InputError, InputFrame, Port, PortKind};
use crate::state::BlockError;

use super::{CoreError, EmulatorCore};

/// Snapshot sizes for the current block set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateSizes {
    /// Full snapshot
    pub total: usize,
    /// Fixed part of a differential snapshot
    pub differential: usize,
}

/// An emulation core plus the controller parser for its ports
///
/// Sizes are always read back from the core, never cached, so toggling a
/// state block is immediately visible to every caller.
pub struct EmulatorInstance<C> {
    core: C,
    parser: ControllerParser,
}

impl<C: EmulatorCore> EmulatorInstance<C> {
    pub fn new(core: C) -> Self {
        Self {
            core,
            parser: ControllerParser::new(),
        }
    }

    pub fn core(&self) -> &C {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut C {
        &mut self.core
    }

    pub fn parser(&self) -> &ControllerParser {
        &self.parser
    }

    pub fn core_name(&self) -> &str {
        self.core.name()
    }

    /// Configure what is plugged into a port (`None` or `Gamepad`)
    pub fn set_controller_type(&mut self, port: Port, kind: &str) -> Result<(), InputError> {
        self.parser.set_port_type(port, kind)?;
        debug!(%port, kind, "controller type set");
        Ok(())
    }

    pub fn controller_type(&self, port: Port) -> PortKind {
        self.parser.port_kind(port)
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), CoreError> {
        self.core.load_rom(rom)
    }

    /// Run one step
    ///
    /// A pressed power switch is refused before anything reaches the core.
    /// A pressed reset switch soft-resets the core, then the frame is applied.
    pub fn advance_state(&mut self, frame: &InputFrame) -> Result<(), ReplayError> {
        if frame.power() {
            return Err(ReplayError::PowerCycleUnsupported);
        }
        if frame.reset() {
            self.core.soft_reset();
        }
        self.core.advance(frame);
        Ok(())
    }

    /// Parse a move token and run one step with it
    pub fn advance_move(&mut self, token: &str) -> Result<(), ReplayError> {
        let frame = self.parser.parse(token)?;
        self.advance_state(&frame)
    }

    pub fn enable_state_block(&mut self, name: &str) -> Result<StateSizes, BlockError> {
        self.core.state_blocks_mut().enable(name)?;
        Ok(self.state_sizes())
    }

    pub fn disable_state_block(&mut self, name: &str) -> Result<StateSizes, BlockError> {
        self.core.state_blocks_mut().disable(name)?;
        Ok(self.state_sizes())
    }

    pub fn state_sizes(&self) -> StateSizes {
        StateSizes {
            total: self.core.state_size(),
            differential: self.core.differential_state_size(),
        }
    }

    pub fn state_size(&self) -> usize {
        self.core.state_size()
    }

    pub fn differential_state_size(&self) -> usize {
        self.core.differential_state_size()
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.core.fingerprint()
    }
}
