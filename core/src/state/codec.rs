//! Per-run state buffers and the save/load operations over them

use crate::emulator::EmulatorCore;

use super::{
    ContiguousReader, ContiguousWriter, DiffScratch, DifferentialReader, DifferentialWriter,
    StateError, StateReader, StateWriter,
};

/// Differential encoding parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferentialSettings {
    /// Encoded run bytes allowed per snapshot, on top of the core's fixed size
    pub max_differences: usize,
    /// Compress each block's run records
    pub compress: bool,
}

/// How snapshots are stored during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    /// Every save overwrites a full snapshot
    Full,
    /// Saves are diffs against the snapshot taken when the run was loaded
    Differential(DifferentialSettings),
}

/// Owns every state buffer a run needs
///
/// Buffers are sized once from the core's reported sizes and reused by every
/// save and load. The differential buffer holds at most
/// `differential_state_size + max_differences` bytes and never grows.
pub struct StateCodec {
    kind: CodecKind,
    /// Full snapshot; the save target in full mode, the diff reference otherwise
    baseline: Vec<u8>,
    differential: Vec<u8>,
    scratch: DiffScratch,
    last_output_size: usize,
    max_output_size: usize,
}

impl StateCodec {
    /// Allocate buffers for a core reporting the given sizes
    pub fn new(kind: CodecKind, state_size: usize, differential_state_size: usize) -> Self {
        let (differential, scratch) = match kind {
            CodecKind::Full => (Vec::new(), DiffScratch::default()),
            CodecKind::Differential(settings) => {
                let capacity = differential_state_size + settings.max_differences;
                (vec![0u8; capacity], DiffScratch::with_capacity(capacity))
            }
        };

        Self {
            kind,
            baseline: vec![0u8; state_size],
            differential,
            scratch,
            last_output_size: 0,
            max_output_size: 0,
        }
    }

    pub fn kind(&self) -> CodecKind {
        self.kind
    }

    /// Full snapshot size in bytes
    pub fn state_size(&self) -> usize {
        self.baseline.len()
    }

    /// Differential buffer capacity (`None` in full mode)
    pub fn capacity(&self) -> Option<usize> {
        match self.kind {
            CodecKind::Full => None,
            CodecKind::Differential(_) => Some(self.differential.len()),
        }
    }

    /// Largest differential save so far (`None` in full mode)
    pub fn max_output_size(&self) -> Option<usize> {
        match self.kind {
            CodecKind::Full => None,
            CodecKind::Differential(_) => Some(self.max_output_size),
        }
    }

    /// Take a full snapshot into the baseline buffer
    pub fn capture_baseline<C: EmulatorCore + ?Sized>(
        &mut self,
        core: &C,
    ) -> Result<usize, StateError> {
        let mut writer = ContiguousWriter::new(&mut self.baseline);
        core.serialize_state(&mut writer)?;
        let written = writer.output_size();
        if written != self.baseline.len() {
            return Err(StateError::SizeMismatch {
                expected: self.baseline.len(),
                actual: written,
            });
        }
        Ok(written)
    }

    /// Save the core's state, returning the encoded size
    pub fn save<C: EmulatorCore + ?Sized>(&mut self, core: &C) -> Result<usize, StateError> {
        let written = match self.kind {
            CodecKind::Full => self.capture_baseline(core)?,
            CodecKind::Differential(settings) => {
                let mut writer = DifferentialWriter::new(
                    &mut self.differential,
                    &self.baseline,
                    settings.max_differences,
                    settings.compress,
                    &mut self.scratch,
                );
                core.serialize_state(&mut writer)?;
                let written = writer.output_size();
                self.max_output_size = self.max_output_size.max(written);
                written
            }
        };
        self.last_output_size = written;
        Ok(written)
    }

    /// Restore the core from the most recent save, returning the bytes consumed
    pub fn load<C: EmulatorCore + ?Sized>(&mut self, core: &mut C) -> Result<usize, StateError> {
        match self.kind {
            CodecKind::Full => {
                let mut reader = ContiguousReader::new(&self.baseline);
                core.deserialize_state(&mut reader)?;
                Ok(reader.input_size())
            }
            CodecKind::Differential(settings) => {
                let mut reader = DifferentialReader::new(
                    &self.differential[..self.last_output_size],
                    &self.baseline,
                    settings.compress,
                    &mut self.scratch,
                );
                core.deserialize_state(&mut reader)?;
                Ok(reader.input_size())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::ReferenceCore;
    use crate::input::{GamepadButtons, InputFrame, PortInput};
    use crate::test_utils::TEST_ROM;

    fn loaded_core() -> ReferenceCore {
        let mut core = ReferenceCore::new();
        core.load_rom(TEST_ROM).unwrap();
        core
    }

    fn press(buttons: GamepadButtons) -> InputFrame {
        InputFrame {
            port1: PortInput::Gamepad(buttons),
            ..Default::default()
        }
    }

    fn codec_for(core: &ReferenceCore, kind: CodecKind) -> StateCodec {
        StateCodec::new(kind, core.state_size(), core.differential_state_size())
    }

    #[test]
    fn test_full_save_load_restores_fingerprint() {
        let mut core = loaded_core();
        core.advance(&press(GamepadButtons::UP));
        let mut codec = codec_for(&core, CodecKind::Full);

        assert_eq!(codec.save(&core).unwrap(), core.state_size());
        let saved = core.fingerprint();

        core.advance(&press(GamepadButtons::FIRE));
        assert_ne!(core.fingerprint(), saved);

        assert_eq!(codec.load(&mut core).unwrap(), core.state_size());
        assert_eq!(core.fingerprint(), saved);
        assert_eq!(codec.capacity(), None);
        assert_eq!(codec.max_output_size(), None);
    }

    fn differential_roundtrip(compress: bool) {
        let mut core = loaded_core();
        let settings = DifferentialSettings {
            max_differences: 4096,
            compress,
        };
        let mut codec = codec_for(&core, CodecKind::Differential(settings));
        codec.capture_baseline(&core).unwrap();

        for _ in 0..8 {
            core.advance(&press(GamepadButtons::RIGHT | GamepadButtons::FIRE));
        }
        let written = codec.save(&core).unwrap();
        let saved = core.fingerprint();
        assert!(written <= codec.capacity().unwrap());
        assert_eq!(codec.max_output_size(), Some(written));

        core.advance(&press(GamepadButtons::LEFT));
        codec.load(&mut core).unwrap();
        assert_eq!(core.fingerprint(), saved);
    }

    #[test]
    fn test_differential_roundtrip_uncompressed() {
        differential_roundtrip(false);
    }

    #[test]
    fn test_differential_roundtrip_compressed() {
        differential_roundtrip(true);
    }

    #[test]
    fn test_differential_capacity_is_fixed() {
        let core = loaded_core();
        let settings = DifferentialSettings {
            max_differences: 100,
            compress: false,
        };
        let codec = codec_for(&core, CodecKind::Differential(settings));
        assert_eq!(
            codec.capacity(),
            Some(core.differential_state_size() + 100)
        );
        assert_eq!(codec.state_size(), core.state_size());
    }

    #[test]
    fn test_differential_budget_too_small_fails() {
        let mut core = loaded_core();
        let settings = DifferentialSettings {
            max_differences: 1,
            compress: false,
        };
        let mut codec = codec_for(&core, CodecKind::Differential(settings));
        codec.capture_baseline(&core).unwrap();

        for _ in 0..4 {
            core.advance(&press(GamepadButtons::DOWN));
        }
        assert!(matches!(
            codec.save(&core),
            Err(StateError::DifferenceBudgetExceeded { max: 1, .. })
        ));
    }

    #[test]
    fn test_baseline_size_mismatch() {
        let core = loaded_core();
        let mut codec = StateCodec::new(CodecKind::Full, core.state_size() + 4, 0);
        assert_eq!(
            codec.capture_baseline(&core),
            Err(StateError::SizeMismatch {
                expected: core.state_size() + 4,
                actual: core.state_size(),
            })
        );
    }
}
