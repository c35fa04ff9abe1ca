use crate::foundation::EndorseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one endorsement attempt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RoundPhase {
    #[default]
    Draft = 0,
    Discovering = 1,
    AwaitingEndorsements = 2,
    Quorate = 3,
    Failed = 4,
}

impl RoundPhase {
    pub fn can_transition_to(self, target: RoundPhase) -> bool {
        use RoundPhase::*;
        matches!(
            (self, target),
            (Draft, Discovering) | (Discovering, AwaitingEndorsements) | (Discovering, Failed) | (AwaitingEndorsements, Quorate) | (AwaitingEndorsements, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RoundPhase::Quorate | RoundPhase::Failed)
    }

    pub fn transition(self, target: RoundPhase) -> Result<RoundPhase, EndorseError> {
        if self.can_transition_to(target) {
            Ok(target)
        } else {
            Err(EndorseError::InvalidStateTransition { from: self.to_string(), to: target.to_string() })
        }
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundPhase::Draft => "draft",
            RoundPhase::Discovering => "discovering",
            RoundPhase::AwaitingEndorsements => "awaiting_endorsements",
            RoundPhase::Quorate => "quorate",
            RoundPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}
