//! Deliberation phase state machine

use serde::{Deserialize, Serialize};

/// Phase of a deliberation session
///
/// Transitions are strictly sequential and forward-only; no phase is
/// ever revisited. `Failed` is reachable from any non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Session created, nothing started yet
    Init,
    /// Gathering initial opinions from all members
    Collecting,
    /// Discussion round r (1-indexed)
    Discussing(usize),
    /// Members vote on the anonymized opinions
    Voting,
    /// Counting votes and assembling the verdict
    Tallying,
    /// Verdict produced; session frozen
    Done,
    /// Quorum lost or unrecoverable error; no verdict
    Failed,
}

impl Phase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Done | Phase::Failed)
    }

    /// Whether the state machine permits moving from `self` to `next`
    pub fn can_advance_to(&self, next: &Phase) -> bool {
        if self.is_terminal() {
            return false;
        }
        if matches!(next, Phase::Failed) {
            return true;
        }

        matches!(
            (self, next),
            (Phase::Init, Phase::Collecting)
                | (Phase::Collecting, Phase::Discussing(1))
                // Zero configured rounds: go straight to voting
                | (Phase::Collecting, Phase::Voting)
                | (Phase::Discussing(_), Phase::Voting)
                | (Phase::Voting, Phase::Tallying)
                | (Phase::Tallying, Phase::Done)
        ) || matches!((self, next), (Phase::Discussing(r), Phase::Discussing(n)) if *n == r + 1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Init => "init",
            Phase::Collecting => "collecting",
            Phase::Discussing(_) => "discussing",
            Phase::Voting => "voting",
            Phase::Tallying => "tallying",
            Phase::Done => "done",
            Phase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Discussing(r) => write!(f, "discussing (round {r})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}
