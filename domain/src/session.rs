//! Session entity - the single mutable record of one deliberation

use crate::anonymizer::{AnonymousId, Anonymizer, Presented};
use crate::ballot::Ballot;
use crate::core::error::DeliberationError;
use crate::core::question::Question;
use crate::member::{Member, MemberHealth, MemberId};
use crate::opinion::Opinion;
use crate::phase::Phase;
use crate::verdict::{ExcludedMember, Verdict};
use std::collections::BTreeMap;

/// One end-to-end deliberation over a single question (Entity)
///
/// The session is owned and mutated exclusively by the coordinator's
/// control task; worker tasks only return results upward. Once a
/// verdict is attached or the session fails terminally, it is frozen:
/// every mutating method rejects terminal phases.
#[derive(Debug)]
pub struct Session {
    id: String,
    question: Question,
    members: BTreeMap<MemberId, Member>,
    anonymizer: Anonymizer,
    opinions: Vec<Opinion>,
    ballots: Vec<Ballot>,
    invalid_votes: usize,
    abstentions: usize,
    phase: Phase,
    verdict: Option<Verdict>,
}

impl Session {
    pub fn new(id: impl Into<String>, question: Question, member_ids: Vec<MemberId>) -> Self {
        let members = member_ids
            .into_iter()
            .map(|id| (id.clone(), Member::new(id)))
            .collect();

        Self {
            id: id.into(),
            question,
            members,
            anonymizer: Anonymizer::new(),
            opinions: Vec::new(),
            ballots: Vec::new(),
            invalid_votes: 0,
            abstentions: 0,
            phase: Phase::Init,
            verdict: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn question(&self) -> &Question {
        &self.question
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Advance the state machine.
    ///
    /// Illegal transitions are an internal invariant violation and
    /// surface as `SessionAborted`.
    pub fn advance(&mut self, next: Phase) -> Result<(), DeliberationError> {
        if !self.phase.can_advance_to(&next) {
            return Err(DeliberationError::SessionAborted(format!(
                "illegal phase transition: {} -> {}",
                self.phase, next
            )));
        }
        self.phase = next;
        Ok(())
    }

    /// Move to `Failed` from any non-terminal phase
    pub fn fail(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = Phase::Failed;
        }
    }

    // ==================== Members ====================

    /// Members still participating in phases, in stable id order
    pub fn active_members(&self) -> Vec<MemberId> {
        self.members
            .values()
            .filter(|m| m.is_active())
            .map(|m| m.id().clone())
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.members.values().filter(|m| m.is_active()).count()
    }

    /// Exclude a member from all later phases.
    ///
    /// Its already-recorded opinions stay live and carry forward.
    pub fn exclude_member(&mut self, id: &MemberId, reason: impl Into<String>) {
        if let Some(member) = self.members.get_mut(id) {
            member.exclude(reason);
        }
    }

    /// Note that a member needed retries this session.
    ///
    /// Degraded members keep participating; the status is carried into
    /// the verdict as provenance.
    pub fn mark_degraded(&mut self, id: &MemberId) {
        if let Some(member) = self.members.get_mut(id) {
            member.mark_degraded();
        }
    }

    /// Members that needed retries but stayed in the session
    pub fn degraded_members(&self) -> Vec<MemberId> {
        self.members
            .values()
            .filter(|m| m.health() == &MemberHealth::Degraded)
            .map(|m| m.id().clone())
            .collect()
    }

    pub fn excluded_members(&self) -> Vec<ExcludedMember> {
        self.members
            .values()
            .filter(|m| !m.is_active())
            .map(|m| ExcludedMember {
                member: m.id().clone(),
                reason: m.exclusion_reason().unwrap_or("unknown").to_string(),
            })
            .collect()
    }

    // ==================== Opinions ====================

    /// Record a member's opinion for a round, assigning its anonymous id
    /// on first contribution.
    pub fn record_opinion(
        &mut self,
        owner: &MemberId,
        text: impl Into<String>,
        round: usize,
    ) -> Result<AnonymousId, DeliberationError> {
        if self.phase.is_terminal() {
            return Err(DeliberationError::SessionAborted(
                "session is frozen".into(),
            ));
        }
        if !self.members.contains_key(owner) {
            return Err(DeliberationError::SessionAborted(format!(
                "opinion from unknown member {owner}"
            )));
        }
        if self
            .opinions
            .iter()
            .any(|op| op.owner == *owner && op.round == round)
        {
            return Err(DeliberationError::SessionAborted(format!(
                "duplicate opinion from {owner} in round {round}"
            )));
        }

        let anonymous_id = self.anonymizer.assign(owner);
        let opinion = match self.opinions.iter().rev().find(|op| op.owner == *owner) {
            Some(previous) => previous.revised(text, round),
            None => Opinion::new(owner.clone(), anonymous_id.clone(), round, text),
        };
        self.opinions.push(opinion);
        Ok(anonymous_id)
    }

    /// The latest opinion of every member that contributed at least one,
    /// ordered by anonymous id.
    ///
    /// Excluded members' last successful opinions are included: failure
    /// mid-discussion never removes a prior contribution.
    pub fn live_opinions(&self) -> Vec<Opinion> {
        let mut latest: BTreeMap<AnonymousId, &Opinion> = BTreeMap::new();
        for op in &self.opinions {
            match latest.get(&op.anonymous_id) {
                Some(existing) if existing.round >= op.round => {}
                _ => {
                    latest.insert(op.anonymous_id.clone(), op);
                }
            }
        }
        latest.into_values().cloned().collect()
    }

    /// Shuffled anonymized presentation of the live opinions
    pub fn present_live(&self) -> Vec<Presented> {
        self.anonymizer.present(&self.live_opinions())
    }

    pub fn opinions(&self) -> &[Opinion] {
        &self.opinions
    }

    pub fn anonymous_id_of(&self, member: &MemberId) -> Option<&AnonymousId> {
        self.anonymizer.id_of(member)
    }

    pub fn resolve(&self, anonymous_id: &AnonymousId) -> Option<&MemberId> {
        self.anonymizer.resolve(anonymous_id)
    }

    /// Anonymous id -> owner mapping for tallying
    pub fn owners(&self) -> BTreeMap<AnonymousId, MemberId> {
        self.anonymizer.owners()
    }

    // ==================== Votes ====================

    pub fn record_ballot(&mut self, ballot: Ballot) {
        self.ballots.push(ballot);
    }

    pub fn record_invalid_vote(&mut self) {
        self.invalid_votes += 1;
    }

    pub fn record_abstention(&mut self) {
        self.abstentions += 1;
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    pub fn invalid_votes(&self) -> usize {
        self.invalid_votes
    }

    pub fn abstentions(&self) -> usize {
        self.abstentions
    }

    // ==================== Verdict ====================

    /// Attach the final verdict; only legal once the session is `Done`
    pub fn attach_verdict(&mut self, verdict: Verdict) -> Result<(), DeliberationError> {
        if self.phase != Phase::Done {
            return Err(DeliberationError::SessionAborted(format!(
                "verdict attached in phase {}",
                self.phase
            )));
        }
        if self.verdict.is_some() {
            return Err(DeliberationError::SessionAborted(
                "verdict already attached".into(),
            ));
        }
        self.verdict = Some(verdict);
        Ok(())
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }
}
