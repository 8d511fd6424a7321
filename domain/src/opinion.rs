//! Opinion entity

use crate::anonymizer::AnonymousId;
use crate::member::MemberId;
use crate::util::current_timestamp_ms;
use serde::{Deserialize, Serialize};

/// One member's answer at a given discussion round (Entity)
///
/// The `owner` field is private to the coordinator's side of the
/// session: members only ever see the `anonymous_id` and `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opinion {
    /// Owning member (never shown to other members)
    pub owner: MemberId,
    /// Public id within the session, stable across rounds for this owner
    pub anonymous_id: AnonymousId,
    /// Round this opinion was produced in (0 = initial opinion)
    pub round: usize,
    /// The opinion text
    pub text: String,
    /// Milliseconds since epoch when the opinion was recorded
    pub timestamp_ms: u64,
}

impl Opinion {
    pub fn new(
        owner: MemberId,
        anonymous_id: AnonymousId,
        round: usize,
        text: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            anonymous_id,
            round,
            text: text.into(),
            timestamp_ms: current_timestamp_ms(),
        }
    }

    /// Produce the revised opinion for a later round.
    ///
    /// Keeps the owner and the anonymous id, so the opinion thread stays
    /// recognizable across rounds.
    pub fn revised(&self, text: impl Into<String>, round: usize) -> Self {
        Self {
            owner: self.owner.clone(),
            anonymous_id: self.anonymous_id.clone(),
            round,
            text: text.into(),
            timestamp_ms: current_timestamp_ms(),
        }
    }
}
