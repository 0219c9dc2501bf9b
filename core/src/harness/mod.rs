//! Replay harness
//!
//! Drives an emulation core through a move sequence and reports a
//! determinism fingerprint and timing. The harness is a small state machine:
//!
//! ```text
//! Idle ──load──▶ Loaded ──step──▶ Running ──finish──▶ Done
//!   │              │                 │
//!   └──────────────┴─── error ───────┴──────▶ Failed
//! ```
//!
//! `Failed` and `Done` are terminal; calls that do not fit the current state
//! return [`ReplayError::InvalidTransition`] and leave the state unchanged.

mod cycle;
mod report;
mod warmup;


pub use cycle::CycleType;
pub use report::{DifferentialSummary, RunReport, RunSummary};
pub use warmup::{WARMUP_DURATION, warm_up};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::emulator::{EmulatorCore, EmulatorInstance};
use crate::error::ReplayError;
use crate::hash::{Fingerprint, rom_sha1, sha1_matches};
use crate::input::{ControllerParser, InputFrame, Port};
use crate::script::TestScript;
use crate::sequence::ReplaySequence;
use crate::state::{CodecKind, ContiguousReader, StateCodec, StateError, StateReader};

/// Harness lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    Idle,
    Loaded,
    Running,
    Done,
    Failed,
}

impl fmt::Display for HarnessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HarnessState::Idle => "idle",
            HarnessState::Loaded => "loaded",
            HarnessState::Running => "running",
            HarnessState::Done => "done",
            HarnessState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub cycle_type: CycleType,
    /// Hex SHA1 the ROM must match (case-insensitive)
    pub expected_rom_sha1: String,
    /// Controller type names for ports 1 and 2
    pub controller_types: [String; 2],
    /// Blocks excluded from serialized state
    pub disabled_blocks: Vec<String>,
    pub codec: CodecKind,
    /// Where to write the final fingerprint
    pub hash_output_file: Option<PathBuf>,
}

impl HarnessConfig {
    pub fn from_script(script: &TestScript, cycle_type: CycleType) -> Self {
        Self {
            cycle_type,
            expected_rom_sha1: script.expected_rom_sha1.clone(),
            controller_types: [
                script.controller1_type.clone(),
                script.controller2_type.clone(),
            ],
            disabled_blocks: script.disable_state_blocks.clone(),
            codec: script.codec_kind(),
            hash_output_file: None,
        }
    }

    pub fn with_hash_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.hash_output_file = Some(path.into());
        self
    }
}

/// Replays move sequences against one core
pub struct ReplayHarness<C> {
    instance: EmulatorInstance<C>,
    config: HarnessConfig,
    state: HarnessState,
    /// Allocated on load
    codec: Option<StateCodec>,
    steps: usize,
    /// Set when the first step is dispatched
    started: Option<Instant>,
}

impl<C: EmulatorCore> ReplayHarness<C> {
    pub fn new(core: C, config: HarnessConfig) -> Self {
        Self {
            instance: EmulatorInstance::new(core),
            config,
            state: HarnessState::Idle,
            codec: None,
            steps: 0,
            started: None,
        }
    }

    pub fn state(&self) -> HarnessState {
        self.state
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn instance(&self) -> &EmulatorInstance<C> {
        &self.instance
    }

    /// Parser for move tokens; port types are applied on load
    pub fn parser(&self) -> &ControllerParser {
        self.instance.parser()
    }

    /// Steps completed so far
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Fingerprint of the core's current work RAM
    pub fn fingerprint(&self) -> Fingerprint {
        self.instance.fingerprint()
    }

    /// Read the ROM and optional initial state from disk, then [`load`](Self::load)
    pub fn load_files(
        &mut self,
        rom_file: &Path,
        initial_state_file: Option<&Path>,
    ) -> Result<RunSummary, ReplayError> {
        self.expect(&[HarnessState::Idle], "load")?;

        let files = read_file("ROM file", rom_file).and_then(|rom| {
            let state = initial_state_file
                .map(|path| read_file("initial state file", path))
                .transpose()?;
            Ok((rom, state))
        });
        let (rom, state) = self.settle(files)?;

        self.load(&rom, state.as_deref())
    }

    /// Verify and load the ROM, then prepare state buffers (`Idle → Loaded`)
    ///
    /// The ROM digest is checked before anything reaches the core.
    pub fn load(
        &mut self,
        rom: &[u8],
        initial_state: Option<&[u8]>,
    ) -> Result<RunSummary, ReplayError> {
        self.expect(&[HarnessState::Idle], "load")?;
        let result = self.try_load(rom, initial_state);
        let summary = self.settle(result)?;
        self.state = HarnessState::Loaded;
        Ok(summary)
    }

    fn try_load(
        &mut self,
        rom: &[u8],
        initial_state: Option<&[u8]>,
    ) -> Result<RunSummary, ReplayError> {
        let digest = rom_sha1(rom);
        if !sha1_matches(&digest, &self.config.expected_rom_sha1) {
            return Err(ReplayError::RomDigestMismatch {
                found: digest,
                expected: self.config.expected_rom_sha1.clone(),
            });
        }
        debug!(sha1 = %digest, "ROM digest verified");

        self.instance.load_rom(rom)?;
        let [port1, port2] = &self.config.controller_types;
        self.instance.set_controller_type(Port::One, port1)?;
        self.instance.set_controller_type(Port::Two, port2)?;

        if let Some(state) = initial_state {
            let mut reader = ContiguousReader::new(state);
            self.instance.core_mut().deserialize_state(&mut reader)?;
            if reader.input_size() != state.len() {
                return Err(StateError::SizeMismatch {
                    expected: reader.input_size(),
                    actual: state.len(),
                }
                .into());
            }
            debug!(bytes = state.len(), "initial state loaded");
        }

        for name in &self.config.disabled_blocks {
            let sizes = self.instance.disable_state_block(name)?;
            debug!(
                block = %name,
                total = sizes.total,
                differential = sizes.differential,
                "state block disabled"
            );
        }

        let sizes = self.instance.state_sizes();
        let mut codec = StateCodec::new(self.config.codec, sizes.total, sizes.differential);
        codec.capture_baseline(self.instance.core())?;
        if let CodecKind::Differential(_) = codec.kind() {
            let written = codec.save(self.instance.core())?;
            debug!(bytes = written, "initial differential state saved");
        }

        let summary = RunSummary {
            core_name: self.instance.core_name().to_string(),
            cycle_type: self.config.cycle_type,
            rom_sha1: digest,
            controllers: [
                self.instance.controller_type(Port::One),
                self.instance.controller_type(Port::Two),
            ],
            state_size: sizes.total,
            disabled_blocks: self
                .instance
                .core()
                .state_blocks()
                .disabled()
                .map(str::to_string)
                .collect(),
            differential: match codec.kind() {
                CodecKind::Full => None,
                CodecKind::Differential(settings) => Some(DifferentialSummary {
                    settings,
                    fixed_size: sizes.differential,
                    full_size: codec.capacity().unwrap_or(sizes.differential),
                }),
            },
        };

        info!(
            core = %summary.core_name,
            state_size = summary.state_size,
            cycle = %summary.cycle_type,
            "ROM loaded"
        );
        self.codec = Some(codec);
        Ok(summary)
    }

    /// Run one cycle with the given input (`Loaded|Running → Running`)
    pub fn step(&mut self, frame: &InputFrame) -> Result<(), ReplayError> {
        self.expect(&[HarnessState::Loaded, HarnessState::Running], "step")?;
        if self.state == HarnessState::Loaded {
            self.state = HarnessState::Running;
            self.started = Some(Instant::now());
        }

        let result = self.run_cycle(frame);
        self.settle(result)?;
        self.steps += 1;
        Ok(())
    }

    fn run_cycle(&mut self, frame: &InputFrame) -> Result<(), ReplayError> {
        let plan = self.config.cycle_type.plan();
        let codec = self
            .codec
            .as_mut()
            .ok_or(ReplayError::InvalidTransition {
                action: "step",
                state: self.state,
            })?;

        if plan.pre_advance {
            self.instance.advance_state(frame)?;
        }
        if plan.load {
            codec.load(self.instance.core_mut())?;
        }
        self.instance.advance_state(frame)?;
        if plan.save {
            codec.save(self.instance.core())?;
        }
        Ok(())
    }

    /// Replay a whole sequence and finish
    pub fn run(&mut self, sequence: &ReplaySequence) -> Result<RunReport, ReplayError> {
        self.expect(&[HarnessState::Loaded], "run")?;
        info!(moves = sequence.len(), cycle = %self.config.cycle_type, "replay started");

        for (index, (token, frame)) in sequence.iter().enumerate() {
            self.step(frame).map_err(|source| ReplayError::Step {
                index,
                token: token.to_string(),
                source: Box::new(source),
            })?;
        }

        self.finish()
    }

    /// Compute the final fingerprint and write it out if configured (`→ Done`)
    pub fn finish(&mut self) -> Result<RunReport, ReplayError> {
        self.expect(&[HarnessState::Loaded, HarnessState::Running], "finish")?;
        let elapsed = self.started.map(|t| t.elapsed()).unwrap_or_default();
        let fingerprint = self.instance.fingerprint();

        if let Some(path) = &self.config.hash_output_file {
            let written = std::fs::write(path, fingerprint.to_string())
                .map_err(|e| ReplayError::io("hash output file", path, e));
            self.settle(written)?;
        }

        let report = RunReport {
            steps: self.steps,
            elapsed,
            fingerprint,
            max_differential_size: self.codec.as_ref().and_then(StateCodec::max_output_size),
        };
        self.state = HarnessState::Done;
        info!(
            steps = report.steps,
            %fingerprint,
            elapsed_ms = elapsed.as_millis() as u64,
            "replay finished"
        );
        Ok(report)
    }

    fn expect(&self, allowed: &[HarnessState], action: &'static str) -> Result<(), ReplayError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(ReplayError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    /// Move to `Failed` on error
    fn settle<T>(&mut self, result: Result<T, ReplayError>) -> Result<T, ReplayError> {
        if let Err(err) = &result {
            warn!(error = %err, state = %self.state, "harness failed");
            self.state = HarnessState::Failed;
        }
        result
    }
}

fn read_file(what: &'static str, path: &Path) -> Result<Vec<u8>, ReplayError> {
    std::fs::read(path).map_err(|e| ReplayError::io(what, path, e))
}
