//! Rerecord Core - deterministic replay harness for emulation cores
//!
//! This crate replays recorded move sequences against an emulation core,
//! optionally saving and restoring state around every step, and reports a
//! fingerprint of work RAM so runs can be compared for determinism.
//!
//! # Architecture
//!
//! - [`EmulatorCore`] - Trait implemented by each emulation core
//! - [`EmulatorInstance`] - Core wrapper applying console switch policy
//! - [`ControllerParser`] - Move tokens to [`InputFrame`]s
//! - [`StateCodec`] - Full and differential state snapshots
//! - [`ReplayHarness`] - Load, replay and fingerprint state machine

pub mod emulator;
pub mod error;
pub mod harness;
pub mod hash;
pub mod input;
pub mod script;
pub mod sequence;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use emulator::{CoreError, EmulatorCore, EmulatorInstance, ReferenceCore, StateSizes};
pub use error::{ErrorClass, ReplayError};
pub use harness::{
    CycleType, DifferentialSummary, HarnessConfig, HarnessState, ReplayHarness, RunReport,
    RunSummary, WARMUP_DURATION, warm_up,
};
pub use hash::{FINGERPRINT_WINDOW, Fingerprint, fingerprint, rom_sha1};
pub use input::{
    ConsoleButtons, ControllerParser, GamepadButtons, InputError, InputFrame, Port, PortInput,
    PortKind,
};
pub use script::{DifferentialCompression, ScriptError, TestScript};
pub use sequence::ReplaySequence;
pub use state::{
    BlockError, CodecKind, DifferentialSettings, StateBlockSet, StateCodec, StateError,
    StateReader, StateWriter,
};
