//! Verdict - the immutable final result of a deliberation

use crate::anonymizer::AnonymousId;
use crate::member::MemberId;
use crate::opinion::Opinion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A member excluded during the session, with the recorded reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedMember {
    pub member: MemberId,
    pub reason: String,
}

/// One opinion as recorded in the verdict, deanonymized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedOpinion {
    pub anonymous_id: AnonymousId,
    pub member: MemberId,
    pub text: String,
    pub timestamp_ms: u64,
}

/// All opinions produced in one round, ordered by anonymous id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundOpinions {
    pub round: usize,
    pub opinions: Vec<RecordedOpinion>,
}

impl RoundOpinions {
    /// Group opinions by round, each round ordered by anonymous id.
    ///
    /// This is the stable ordering the serialized record promises:
    /// by round, then by anonymous id.
    pub fn group(opinions: &[Opinion]) -> Vec<RoundOpinions> {
        let mut by_round: BTreeMap<usize, Vec<RecordedOpinion>> = BTreeMap::new();
        for op in opinions {
            by_round
                .entry(op.round)
                .or_default()
                .push(RecordedOpinion {
                    anonymous_id: op.anonymous_id.clone(),
                    member: op.owner.clone(),
                    text: op.text.clone(),
                    timestamp_ms: op.timestamp_ms,
                });
        }

        by_round
            .into_iter()
            .map(|(round, mut opinions)| {
                opinions.sort_by(|a, b| a.anonymous_id.cmp(&b.anonymous_id));
                RoundOpinions { round, opinions }
            })
            .collect()
    }
}

/// The final structured result of a deliberation session.
///
/// Immutable once produced, and independently serializable: persisting
/// and re-parsing this record yields an identical structure without
/// re-running the deliberation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub session_id: String,
    pub question: String,
    /// The winning opinion text
    pub winning_text: String,
    /// Deanonymized owner of the winning opinion
    pub winning_member: MemberId,
    pub winning_anonymous_id: AnonymousId,
    /// Valid votes per anonymous id
    pub vote_counts: BTreeMap<AnonymousId, usize>,
    pub total_votes: usize,
    /// Full opinion history, ordered by round then anonymous id
    pub opinions_by_round: Vec<RoundOpinions>,
    /// Self-votes and votes for unknown ids, discarded from the tally
    pub invalid_votes: usize,
    /// Members that failed to cast a parseable vote
    pub abstentions: usize,
    /// Members that needed retries but stayed in the session
    pub degraded: Vec<MemberId>,
    /// Members excluded during the session, with reasons
    pub excluded: Vec<ExcludedMember>,
}
