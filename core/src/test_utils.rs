//! Shared test utilities for unit tests

use crate::emulator::{CoreError, EmulatorCore, ReferenceCore};
use crate::input::InputFrame;
use crate::state::{StateBlockSet, StateError, StateReader, StateWriter};

/// Small ROM image; the last two bytes hold the reset vector
pub const TEST_ROM: &[u8] = &[
    0xA9, 0x01, 0x85, 0x80, 0xE8, 0x4C, 0x07, 0xF0, 0xA2, 0x3F, 0x9A, 0xD0, 0xFD, 0x00, 0xF0,
];

/// Calls observed by [`RecordingCore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreEvent {
    LoadRom,
    Advance(InputFrame),
    SoftReset,
    HardReset,
    Deserialize,
}

/// Reference core that logs every call it receives
pub struct RecordingCore {
    inner: ReferenceCore,
    events: Vec<CoreEvent>,
}

impl RecordingCore {
    pub fn new() -> Self {
        Self {
            inner: ReferenceCore::new(),
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[CoreEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of advance calls seen
    pub fn advances(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, CoreEvent::Advance(_)))
            .count()
    }
}

impl EmulatorCore for RecordingCore {
    fn name(&self) -> &str {
        "Recording"
    }

    fn load_rom(&mut self, rom: &[u8]) -> Result<(), CoreError> {
        self.events.push(CoreEvent::LoadRom);
        self.inner.load_rom(rom)
    }

    fn advance(&mut self, frame: &InputFrame) {
        self.events.push(CoreEvent::Advance(*frame));
        self.inner.advance(frame);
    }

    fn soft_reset(&mut self) {
        self.events.push(CoreEvent::SoftReset);
        self.inner.soft_reset();
    }

    fn hard_reset(&mut self) {
        self.events.push(CoreEvent::HardReset);
        self.inner.hard_reset();
    }

    fn peek_work_ram(&self, address: usize) -> u8 {
        self.inner.peek_work_ram(address)
    }

    fn state_blocks(&self) -> &StateBlockSet {
        self.inner.state_blocks()
    }

    fn state_blocks_mut(&mut self) -> &mut StateBlockSet {
        self.inner.state_blocks_mut()
    }

    fn state_size(&self) -> usize {
        self.inner.state_size()
    }

    fn differential_state_size(&self) -> usize {
        self.inner.differential_state_size()
    }

    // Serialization takes &self, so it is not recorded
    fn serialize_state(&self, writer: &mut dyn StateWriter) -> Result<(), StateError> {
        self.inner.serialize_state(writer)
    }

    fn deserialize_state(&mut self, reader: &mut dyn StateReader) -> Result<(), StateError> {
        self.events.push(CoreEvent::Deserialize);
        self.inner.deserialize_state(reader)
    }
}
