//! Phases of the stage controller state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the pipeline currently stands.
///
/// The phase is always derived from the cursor, the log length and the
/// finished flag; it is never stored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum ControllerPhase {
    /// Waiting for the initial story (cursor 0, empty log).
    AwaitingInput,
    /// The stage at `stage` has no record yet.
    AwaitingGeneration {
        /// Catalog index of the stage.
        stage: usize,
    },
    /// The stage at `stage` has a record that is not approved yet.
    AwaitingUserDecision {
        /// Catalog index of the stage.
        stage: usize,
    },
    /// The last stage has been approved.
    Completed,
}

impl ControllerPhase {
    /// Derives the phase from raw pipeline state.
    #[must_use]
    pub fn derive(cursor: usize, log_len: usize, finished: bool) -> Self {
        if finished {
            Self::Completed
        } else if log_len == 0 && cursor == 0 {
            Self::AwaitingInput
        } else if log_len == cursor {
            Self::AwaitingGeneration { stage: cursor }
        } else {
            Self::AwaitingUserDecision { stage: cursor }
        }
    }

    /// Returns the stage index the phase refers to, if any.
    #[must_use]
    pub fn stage_index(&self) -> Option<usize> {
        match self {
            Self::AwaitingGeneration { stage } | Self::AwaitingUserDecision { stage } => {
                Some(*stage)
            }
            Self::AwaitingInput | Self::Completed => None,
        }
    }

    /// Returns true once the pipeline has completed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for ControllerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingInput => write!(f, "awaiting input"),
            Self::AwaitingGeneration { stage } => {
                write!(f, "awaiting generation of stage {stage}")
            }
            Self::AwaitingUserDecision { stage } => {
                write!(f, "awaiting a decision on stage {stage}")
            }
            Self::Completed => write!(f, "completed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_phases() {
        assert_eq!(ControllerPhase::derive(0, 0, false), ControllerPhase::AwaitingInput);
        assert_eq!(
            ControllerPhase::derive(1, 1, false),
            ControllerPhase::AwaitingGeneration { stage: 1 }
        );
        assert_eq!(
            ControllerPhase::derive(1, 2, false),
            ControllerPhase::AwaitingUserDecision { stage: 1 }
        );
        assert_eq!(ControllerPhase::derive(2, 3, true), ControllerPhase::Completed);
    }

    #[test]
    fn test_stage_index() {
        assert_eq!(ControllerPhase::AwaitingInput.stage_index(), None);
        assert_eq!(ControllerPhase::AwaitingUserDecision { stage: 4 }.stage_index(), Some(4));
        assert_eq!(ControllerPhase::Completed.stage_index(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(ControllerPhase::AwaitingInput.to_string(), "awaiting input");
        assert_eq!(ControllerPhase::Completed.to_string(), "completed");
        assert!(ControllerPhase::Completed.is_terminal());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ControllerPhase::AwaitingGeneration { stage: 2 }).unwrap();
        assert_eq!(json, r#"{"phase":"awaiting_generation","stage":2}"#);
    }
}
