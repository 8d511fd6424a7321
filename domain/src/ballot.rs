//! Ballots and the tally algorithm

use crate::anonymizer::AnonymousId;
use crate::member::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One member's vote for an anonymous opinion (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Voting member (never shown to other members)
    pub voter: MemberId,
    /// The anonymous opinion being voted for
    pub target: AnonymousId,
    /// Round the vote was cast in
    pub round: usize,
}

impl Ballot {
    pub fn new(voter: MemberId, target: AnonymousId, round: usize) -> Self {
        Self {
            voter,
            target,
            round,
        }
    }

    /// Classify this ballot against the anonymous id -> owner mapping.
    ///
    /// Self-votes and votes for ids that resolve to nothing are invalid;
    /// they are discarded from the tally but never abort the session.
    pub fn classify(&self, owners: &BTreeMap<AnonymousId, MemberId>) -> BallotOutcome {
        match owners.get(&self.target) {
            Some(owner) if *owner == self.voter => BallotOutcome::SelfVote,
            Some(_) => BallotOutcome::Valid,
            None => BallotOutcome::UnknownTarget,
        }
    }
}

/// Validity classification of a received ballot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallotOutcome {
    Valid,
    /// The target resolves to the voter's own opinion
    SelfVote,
    /// The target resolves to no live opinion
    UnknownTarget,
}

impl BallotOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, BallotOutcome::Valid)
    }
}

/// Result of counting the valid ballots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    /// The anonymous opinion with the most votes (after tie-break)
    pub winner: AnonymousId,
    /// Votes per anonymous id
    pub counts: BTreeMap<AnonymousId, usize>,
    /// Total valid votes counted
    pub total_votes: usize,
}

/// Count valid ballots and pick the winner.
///
/// The winner is the opinion with strictly the highest vote count.
/// Ties are broken deterministically: among tied opinions, the one
/// owned by the lexicographically smallest member id wins. This is a
/// documented policy, not incidental iteration order, so re-running the
/// tally on the same ballots always yields the same winner.
///
/// Ballots must already be classified as valid; anything that does not
/// resolve through `owners` is ignored here. Returns `None` when no
/// ballot counts.
pub fn tally(ballots: &[Ballot], owners: &BTreeMap<AnonymousId, MemberId>) -> Option<Tally> {
    let mut counts: BTreeMap<AnonymousId, usize> = BTreeMap::new();
    for ballot in ballots {
        if owners.contains_key(&ballot.target) {
            *counts.entry(ballot.target.clone()).or_insert(0) += 1;
        }
    }

    let winner = counts
        .iter()
        .max_by(|(id_a, count_a), (id_b, count_b)| {
            count_a
                .cmp(count_b)
                // For equal counts, prefer the smaller owner id. max_by
                // keeps the greater element, so compare owners reversed.
                .then_with(|| owners[*id_b].cmp(&owners[*id_a]))
        })
        .map(|(id, _)| id.clone())?;

    let total_votes = counts.values().sum();

    Some(Tally {
        winner,
        counts,
        total_votes,
    })
}
