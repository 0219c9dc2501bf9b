//! Run summary and report types

use std::time::Duration;

use crate::hash::Fingerprint;
use crate::input::PortKind;
use crate::state::DifferentialSettings;

use super::CycleType;

/// Differential snapshot sizes for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferentialSummary {
    pub settings: DifferentialSettings,
    /// Fixed part reported by the core
    pub fixed_size: usize,
    /// Buffer capacity: fixed part plus the difference budget
    pub full_size: usize,
}

/// Run configuration as loaded, reported before the sequence starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub core_name: String,
    pub cycle_type: CycleType,
    pub rom_sha1: String,
    pub controllers: [PortKind; 2],
    pub state_size: usize,
    pub disabled_blocks: Vec<String>,
    /// `None` when saves are full snapshots
    pub differential: Option<DifferentialSummary>,
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub steps: usize,
    /// Time spent in the replay loop only
    pub elapsed: Duration,
    pub fingerprint: Fingerprint,
    /// Largest differential save (`None` when saves are full snapshots)
    pub max_differential_size: Option<usize>,
}

impl RunReport {
    pub fn inputs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.steps as f64 / secs
        } else {
            0.0
        }
    }
}
