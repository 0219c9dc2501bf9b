//! Per-step cycle types

use std::fmt;
use std::str::FromStr;

use crate::error::ReplayError;

/// What the harness does with each input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CycleType {
    /// Advance once
    #[default]
    Simple,
    /// Advance, restore the saved state, advance again, save
    Rerecord,
}

/// Phases of one cycle, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CyclePlan {
    pub pre_advance: bool,
    pub load: bool,
    pub save: bool,
}

impl CycleType {
    pub(crate) fn plan(self) -> CyclePlan {
        match self {
            CycleType::Simple => CyclePlan {
                pre_advance: false,
                load: false,
                save: false,
            },
            CycleType::Rerecord => CyclePlan {
                pre_advance: true,
                load: true,
                save: true,
            },
        }
    }
}

impl FromStr for CycleType {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Simple" => Ok(CycleType::Simple),
            "Rerecord" => Ok(CycleType::Rerecord),
            _ => Err(ReplayError::UnknownCycleType(s.to_string())),
        }
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleType::Simple => write!(f, "Simple"),
            CycleType::Rerecord => write!(f, "Rerecord"),
        }
    }
}
