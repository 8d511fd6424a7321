//! Deliberation configuration
//!
//! An explicit value passed into the coordinator at session creation,
//! never process-wide state, so multiple sessions can run independently.

use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How votes decide the winner.
///
/// Only majority counting exists today; the enum is the reserved
/// surface for future alternate modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingMode {
    #[default]
    Majority,
}

/// Parameters of one deliberation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliberationConfig {
    /// Number of discussion rounds between collection and voting
    pub discussion_rounds: usize,
    /// Minimum members that must keep contributing for the session to
    /// stay valid (also the minimum number of valid votes); floor is 2
    pub min_quorum: usize,
    /// Timeout for each individual member call attempt
    pub per_call_timeout: Duration,
    /// Retries per call after the first attempt
    pub max_retries: usize,
    /// First backoff delay; doubles per retry
    pub initial_backoff: Duration,
    /// Optional overall deadline per phase; outstanding calls are
    /// cancelled when it expires
    pub phase_deadline: Option<Duration>,
    /// Vote counting mode
    pub voting_mode: VotingMode,
}

impl Default for DeliberationConfig {
    fn default() -> Self {
        Self {
            discussion_rounds: 2,
            min_quorum: 2,
            per_call_timeout: Duration::from_secs(60),
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            phase_deadline: None,
            voting_mode: VotingMode::Majority,
        }
    }
}

impl DeliberationConfig {
    // ==================== Builder Methods ====================

    pub fn with_discussion_rounds(mut self, rounds: usize) -> Self {
        self.discussion_rounds = rounds;
        self
    }

    /// Set the quorum minimum; values below 2 are clamped to 2
    pub fn with_min_quorum(mut self, quorum: usize) -> Self {
        self.min_quorum = quorum.max(2);
        self
    }

    pub fn with_per_call_timeout(mut self, timeout: Duration) -> Self {
        self.per_call_timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn with_phase_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.phase_deadline = deadline;
        self
    }

    pub fn with_voting_mode(mut self, mode: VotingMode) -> Self {
        self.voting_mode = mode;
        self
    }

    /// The per-call retry policy derived from this configuration
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            per_call_timeout: self.per_call_timeout,
            max_retries: self.max_retries,
            initial_backoff: self.initial_backoff,
            max_backoff: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DeliberationConfig::default();
        assert_eq!(config.discussion_rounds, 2);
        assert_eq!(config.min_quorum, 2);
        assert_eq!(config.per_call_timeout, Duration::from_secs(60));
        assert_eq!(config.max_retries, 3);
        assert!(config.phase_deadline.is_none());
        assert_eq!(config.voting_mode, VotingMode::Majority);
    }

    #[test]
    fn test_quorum_floor_is_two() {
        let config = DeliberationConfig::default().with_min_quorum(0);
        assert_eq!(config.min_quorum, 2);

        let config = DeliberationConfig::default().with_min_quorum(5);
        assert_eq!(config.min_quorum, 5);
    }

    #[test]
    fn test_builder() {
        let config = DeliberationConfig::default()
            .with_discussion_rounds(4)
            .with_per_call_timeout(Duration::from_secs(10))
            .with_phase_deadline(Some(Duration::from_secs(120)));

        assert_eq!(config.discussion_rounds, 4);
        assert_eq!(config.retry_policy().per_call_timeout, Duration::from_secs(10));
        assert_eq!(config.phase_deadline, Some(Duration::from_secs(120)));
    }
}
