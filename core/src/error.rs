//! Replay error type
//!
//! Component errors convert into [`ReplayError`] with `?`. Every error is
//! fatal to the run; [`ReplayError::class`] tells configuration mistakes
//! apart from failures that happen while replaying.

use std::path::PathBuf;

use crate::emulator::CoreError;
use crate::harness::HarnessState;
use crate::input::InputError;
use crate::script::ScriptError;
use crate::state::{BlockError, StateError};

/// Broad error category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input or configuration, detectable before running
    Logic,
    /// Failure while loading or replaying
    Runtime,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Block(#[from] BlockError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("power button pressed, but power cycling is not supported")]
    PowerCycleUnsupported,

    #[error("wrong ROM SHA1. Found: '{found}', expected: '{expected}'")]
    RomDigestMismatch { found: String, expected: String },

    #[error("cycle type not recognized: '{0}'")]
    UnknownCycleType(String),

    #[error("cannot {action} while the harness is {state}")]
    InvalidTransition {
        action: &'static str,
        state: HarnessState,
    },

    #[error("I/O error on {what} '{}': {source}", path.display())]
    Io {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure while replaying one token of the sequence
    #[error("step {index} ('{token}'): {source}")]
    Step {
        index: usize,
        token: String,
        #[source]
        source: Box<ReplayError>,
    },
}

impl ReplayError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ReplayError::Input(_)
            | ReplayError::Block(_)
            | ReplayError::Script(_)
            | ReplayError::RomDigestMismatch { .. }
            | ReplayError::UnknownCycleType(_)
            | ReplayError::InvalidTransition { .. } => ErrorClass::Logic,
            ReplayError::State(_)
            | ReplayError::Core(_)
            | ReplayError::PowerCycleUnsupported
            | ReplayError::Io { .. } => ErrorClass::Runtime,
            ReplayError::Step { source, .. } => source.class(),
        }
    }

    pub(crate) fn io(what: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReplayError::Io {
            what,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes() {
        let err: ReplayError = InputError::UnknownControllerType("Paddle".into()).into();
        assert_eq!(err.class(), ErrorClass::Logic);

        let err: ReplayError = BlockError::NotFound("Video".into()).into();
        assert_eq!(err.class(), ErrorClass::Logic);

        let err: ReplayError = StateError::DifferenceBudgetExceeded {
            differences: 10,
            max: 4,
        }
        .into();
        assert_eq!(err.class(), ErrorClass::Runtime);

        assert_eq!(
            ReplayError::PowerCycleUnsupported.class(),
            ErrorClass::Runtime
        );
    }

    #[test]
    fn test_step_error_keeps_inner_class() {
        let err = ReplayError::Step {
            index: 3,
            token: "P".into(),
            source: Box::new(ReplayError::PowerCycleUnsupported),
        };
        assert_eq!(err.class(), ErrorClass::Runtime);
        assert_eq!(
            err.to_string(),
            "step 3 ('P'): power button pressed, but power cycling is not supported"
        );
    }

    #[test]
    fn test_digest_mismatch_message() {
        let err = ReplayError::RomDigestMismatch {
            found: "aa".into(),
            expected: "bb".into(),
        };
        assert_eq!(err.to_string(), "wrong ROM SHA1. Found: 'aa', expected: 'bb'");
        assert_eq!(err.class(), ErrorClass::Logic);
    }
}
