//! Domain error types

use thiserror::Error;

/// Session-level deliberation errors.
///
/// Per-member call failures never surface here: they are absorbed as
/// member exclusions. These variants represent the points where the
/// session itself can no longer produce a valid result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliberationError {
    #[error("insufficient members: {have} contributed, quorum is {need}")]
    InsufficientMembers { have: usize, need: usize },

    #[error("insufficient votes: {have} valid votes cast, quorum is {need}")]
    InsufficientVotes { have: usize, need: usize },

    #[error("session aborted: {0}")]
    SessionAborted(String),
}

impl DeliberationError {
    /// Check whether this error represents a quorum loss
    pub fn is_quorum_loss(&self) -> bool {
        matches!(
            self,
            DeliberationError::InsufficientMembers { .. }
                | DeliberationError::InsufficientVotes { .. }
        )
    }
}
