//! Run Deliberation use case
//!
//! The coordinator owns the phase state machine: it fans out concurrent
//! requests to members, anonymizes and re-presents their opinions across
//! discussion rounds, collects votes, tallies with deterministic
//! tie-breaking, and tolerates partial member failure without aborting
//! the session.

use crate::config::DeliberationConfig;
use crate::fanout::{MemberCall, fan_out};
use crate::ports::member_gateway::MemberGateway;
use crate::ports::progress::{DeliberationProgress, NoProgress};
use council_domain::{
    Ballot, BallotOutcome, DeliberationError, ExcludedMember, MemberId, Phase, Presented,
    PromptTemplate, Question, RoundOpinions, Session, Verdict, extract_ballot_target, tally,
    util::current_timestamp_ms,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Input for one deliberation session
#[derive(Debug, Clone)]
pub struct DeliberationInput {
    pub question: Question,
    pub config: DeliberationConfig,
}

impl DeliberationInput {
    pub fn new(question: impl Into<Question>, config: DeliberationConfig) -> Self {
        Self {
            question: question.into(),
            config,
        }
    }
}

/// Surfaced when a session fails terminally: the reason, the phase it
/// failed in, and partial history for diagnostics. Never contains a
/// verdict - callers distinguish failure from success by type alone.
#[derive(Debug)]
pub struct FailureReport {
    pub error: DeliberationError,
    /// The phase the session was in when it failed
    pub phase: Phase,
    /// Opinion history collected before the failure
    pub opinions_by_round: Vec<RoundOpinions>,
    /// Members excluded before the failure, with reasons
    pub excluded: Vec<ExcludedMember>,
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deliberation failed during {}: {}", self.phase, self.error)
    }
}

impl std::error::Error for FailureReport {}

/// Use case for running a full deliberation session
pub struct RunDeliberationUseCase {
    gateways: BTreeMap<MemberId, Arc<dyn MemberGateway>>,
}

impl RunDeliberationUseCase {
    pub fn new(gateways: Vec<Arc<dyn MemberGateway>>) -> Self {
        let gateways = gateways
            .into_iter()
            .map(|g| (g.member_id().clone(), g))
            .collect();
        Self { gateways }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: DeliberationInput) -> Result<Verdict, FailureReport> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: DeliberationInput,
        progress: &dyn DeliberationProgress,
    ) -> Result<Verdict, FailureReport> {
        let session_id = format!("session-{}", current_timestamp_ms());
        let mut session = Session::new(
            session_id,
            input.question.clone(),
            self.gateways.keys().cloned().collect(),
        );

        match self.run(&mut session, &input.config, progress).await {
            Ok(verdict) => Ok(verdict),
            Err(error) => {
                let phase = session.phase();
                session.fail();
                warn!(%error, %phase, "deliberation failed");
                Err(FailureReport {
                    error,
                    phase,
                    opinions_by_round: RoundOpinions::group(session.opinions()),
                    excluded: session.excluded_members(),
                })
            }
        }
    }

    async fn run(
        &self,
        session: &mut Session,
        config: &DeliberationConfig,
        progress: &dyn DeliberationProgress,
    ) -> Result<Verdict, DeliberationError> {
        info!(
            session = session.id(),
            members = self.gateways.len(),
            rounds = config.discussion_rounds,
            "starting deliberation"
        );

        self.preflight(session).await;

        self.phase_collect(session, config, progress).await?;

        for round in 1..=config.discussion_rounds {
            self.phase_discuss(session, config, progress, round).await?;
        }

        self.phase_vote(session, config, progress).await?;

        self.phase_tally(session)
    }

    /// Pre-filter members whose backend is unreachable before any phase
    async fn preflight(&self, session: &mut Session) {
        let mut join_set = JoinSet::new();
        for (member, gateway) in &self.gateways {
            let gateway = Arc::clone(gateway);
            let member = member.clone();
            join_set.spawn(async move {
                let healthy = gateway.health_check().await;
                (member, healthy)
            });
        }

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((member, true)) => debug!(%member, "health check passed"),
                Ok((member, false)) => {
                    warn!(%member, "health check failed; excluding member");
                    session.exclude_member(&member, "health check failed");
                }
                Err(e) => warn!("health check task join error: {e}"),
            }
        }
    }

    /// COLLECTING: every healthy member answers the question in parallel
    async fn phase_collect(
        &self,
        session: &mut Session,
        config: &DeliberationConfig,
        progress: &dyn DeliberationProgress,
    ) -> Result<(), DeliberationError> {
        session.advance(Phase::Collecting)?;
        let members = session.active_members();
        progress.on_phase_start(&Phase::Collecting, members.len());

        let prompt = PromptTemplate::opinion_prompt(session.question().content());
        let calls: BTreeMap<_, _> = members
            .iter()
            .map(|m| (m.clone(), MemberCall::new(prompt.clone(), None)))
            .collect();

        let outcomes = fan_out(
            &self.gateways,
            calls,
            config.retry_policy(),
            config.phase_deadline,
        )
        .await;

        for (member, outcome) in outcomes {
            match outcome {
                Ok(reply) => {
                    info!(%member, "initial opinion collected");
                    progress.on_member_complete(&Phase::Collecting, &member, true);
                    if reply.retried {
                        session.mark_degraded(&member);
                    }
                    session.record_opinion(&member, reply.text, 0)?;
                }
                Err(e) => {
                    warn!(%member, error = %e, "excluding member after failed opinion");
                    progress.on_member_complete(&Phase::Collecting, &member, false);
                    session.exclude_member(&member, e.to_string());
                }
            }
        }

        progress.on_phase_complete(&Phase::Collecting);
        self.check_member_quorum(session, config)
    }

    /// DISCUSSING(round): members revise their opinions against the
    /// anonymized presentation of the previous round
    async fn phase_discuss(
        &self,
        session: &mut Session,
        config: &DeliberationConfig,
        progress: &dyn DeliberationProgress,
        round: usize,
    ) -> Result<(), DeliberationError> {
        let phase = Phase::Discussing(round);
        session.advance(phase)?;
        let members = session.active_members();
        progress.on_phase_start(&phase, members.len());

        let prompt = PromptTemplate::revision_prompt(session.question().content());
        let calls: BTreeMap<_, _> = members
            .iter()
            .map(|member| {
                let own = session.anonymous_id_of(member).cloned();
                let presented = session.present_live();
                let context = PromptTemplate::presentation_block(&presented, own.as_ref());
                (
                    member.clone(),
                    MemberCall::new(prompt.clone(), Some(context)),
                )
            })
            .collect();

        let outcomes = fan_out(
            &self.gateways,
            calls,
            config.retry_policy(),
            config.phase_deadline,
        )
        .await;

        for (member, outcome) in outcomes {
            match outcome {
                Ok(reply) => {
                    debug!(%member, round, "opinion revised");
                    progress.on_member_complete(&phase, &member, true);
                    if reply.retried {
                        session.mark_degraded(&member);
                    }
                    session.record_opinion(&member, reply.text, round)?;
                }
                Err(e) => {
                    // The member drops out of later phases, but its last
                    // successful opinion stays live.
                    warn!(%member, round, error = %e, "excluding member mid-discussion");
                    progress.on_member_complete(&phase, &member, false);
                    session
                        .exclude_member(&member, format!("failed in discussion round {round}: {e}"));
                }
            }
        }

        progress.on_phase_complete(&phase);
        self.check_member_quorum(session, config)
    }

    /// VOTING: each active member names the anonymous opinion it judges
    /// best; its own opinion is filtered from the choices it is shown
    async fn phase_vote(
        &self,
        session: &mut Session,
        config: &DeliberationConfig,
        progress: &dyn DeliberationProgress,
    ) -> Result<(), DeliberationError> {
        session.advance(Phase::Voting)?;
        let members = session.active_members();
        progress.on_phase_start(&Phase::Voting, members.len());

        let prompt = PromptTemplate::voting_prompt(session.question().content());
        let calls: BTreeMap<_, _> = members
            .iter()
            .map(|member| {
                let own = session.anonymous_id_of(member).cloned();
                let choices: Vec<Presented> = session
                    .present_live()
                    .into_iter()
                    .filter(|p| own.as_ref() != Some(&p.anonymous_id))
                    .collect();
                let context = PromptTemplate::presentation_block(&choices, None);
                (
                    member.clone(),
                    MemberCall::new(prompt.clone(), Some(context)),
                )
            })
            .collect();

        let outcomes = fan_out(
            &self.gateways,
            calls,
            config.retry_policy(),
            config.phase_deadline,
        )
        .await;

        let owners = session.owners();
        // Extraction considers every live id, not just the choices the
        // voter was shown, so a self-vote is caught on receipt instead
        // of silently misparsing.
        let all_ids: Vec<_> = owners.keys().cloned().collect();
        let voting_round = config.discussion_rounds;

        for (member, outcome) in outcomes {
            match outcome {
                Ok(reply) => {
                    if reply.retried {
                        session.mark_degraded(&member);
                    }
                    match extract_ballot_target(&reply.text, &all_ids) {
                        Some(target) => {
                            let ballot = Ballot::new(member.clone(), target, voting_round);
                            match ballot.classify(&owners) {
                                BallotOutcome::Valid => {
                                    info!(%member, target = %ballot.target, "vote recorded");
                                    progress.on_member_complete(&Phase::Voting, &member, true);
                                    session.record_ballot(ballot);
                                }
                                BallotOutcome::SelfVote => {
                                    warn!(%member, "self-vote discarded as invalid");
                                    progress.on_member_complete(&Phase::Voting, &member, false);
                                    session.record_invalid_vote();
                                }
                                BallotOutcome::UnknownTarget => {
                                    warn!(
                                        %member,
                                        "vote for unknown opinion discarded as invalid"
                                    );
                                    progress.on_member_complete(&Phase::Voting, &member, false);
                                    session.record_invalid_vote();
                                }
                            }
                        }
                        None => {
                            warn!(%member, "unparseable vote recorded as abstention");
                            progress.on_member_complete(&Phase::Voting, &member, false);
                            session.record_abstention();
                        }
                    }
                }
                Err(e) => {
                    warn!(%member, error = %e, "member failed to vote; recording abstention");
                    progress.on_member_complete(&Phase::Voting, &member, false);
                    session.record_abstention();
                }
            }
        }

        progress.on_phase_complete(&Phase::Voting);

        let have = session.ballots().len();
        if have < config.min_quorum {
            return Err(DeliberationError::InsufficientVotes {
                have,
                need: config.min_quorum,
            });
        }
        Ok(())
    }

    /// TALLYING: count votes, deanonymize the winner, assemble the verdict
    fn phase_tally(&self, session: &mut Session) -> Result<Verdict, DeliberationError> {
        session.advance(Phase::Tallying)?;

        let owners = session.owners();
        let tally = tally(session.ballots(), &owners).ok_or_else(|| {
            DeliberationError::SessionAborted("tally produced no winner".into())
        })?;

        let winning_member = session
            .resolve(&tally.winner)
            .cloned()
            .ok_or_else(|| {
                DeliberationError::SessionAborted(format!(
                    "winner {} resolves to no member",
                    tally.winner
                ))
            })?;

        let winning_text = session
            .live_opinions()
            .into_iter()
            .find(|op| op.anonymous_id == tally.winner)
            .map(|op| op.text)
            .ok_or_else(|| {
                DeliberationError::SessionAborted(format!(
                    "winner {} has no live opinion",
                    tally.winner
                ))
            })?;

        session.advance(Phase::Done)?;

        let verdict = Verdict {
            session_id: session.id().to_string(),
            question: session.question().content().to_string(),
            winning_text,
            winning_member: winning_member.clone(),
            winning_anonymous_id: tally.winner,
            vote_counts: tally.counts,
            total_votes: tally.total_votes,
            opinions_by_round: RoundOpinions::group(session.opinions()),
            invalid_votes: session.invalid_votes(),
            abstentions: session.abstentions(),
            degraded: session.degraded_members(),
            excluded: session.excluded_members(),
        };

        session.attach_verdict(verdict.clone())?;
        info!(
            session = session.id(),
            winner = %winning_member,
            votes = verdict.total_votes,
            "deliberation done"
        );
        Ok(verdict)
    }

    fn check_member_quorum(
        &self,
        session: &Session,
        config: &DeliberationConfig,
    ) -> Result<(), DeliberationError> {
        let have = session.active_count();
        if have < config.min_quorum {
            return Err(DeliberationError::InsufficientMembers {
                have,
                need: config.min_quorum,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::member_gateway::GatewayError;
    use async_trait::async_trait;
    use std::collections::{BTreeSet, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    /// One scripted reply per received call, in order
    enum Step {
        Reply(&'static str),
        /// Fatal error: excluded without retries
        FailFatal,
        /// Retryable error: the next step answers the retry
        FailTransient,
        /// Sleeps past any per-call timeout
        Hang,
        /// Vote for the presented opinion whose text contains this
        VoteForText(&'static str),
        /// Vote for the anonymous id learned from a "(yours)" tag
        VoteForOwn,
    }

    struct ScriptedGateway {
        id: MemberId,
        script: Mutex<VecDeque<Step>>,
        contexts: Mutex<Vec<String>>,
        own_id: Mutex<Option<String>>,
        healthy: bool,
    }

    impl ScriptedGateway {
        fn new(name: &str, steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                id: MemberId::new(name),
                script: Mutex::new(steps.into()),
                contexts: Mutex::new(Vec::new()),
                own_id: Mutex::new(None),
                healthy: true,
            })
        }

        fn unhealthy(name: &str) -> Arc<Self> {
            Arc::new(Self {
                id: MemberId::new(name),
                script: Mutex::new(VecDeque::new()),
                contexts: Mutex::new(Vec::new()),
                own_id: Mutex::new(None),
                healthy: false,
            })
        }

        fn contexts(&self) -> Vec<String> {
            self.contexts.lock().unwrap().clone()
        }
    }

    /// Parse `(id, is_yours, text)` triples out of a presentation block
    fn parse_blocks(context: &str) -> Vec<(String, bool, String)> {
        context
            .split("\n\n")
            .filter_map(|block| {
                let (header, body) = block.split_once(":\n")?;
                let id = header.split("(ID: ").nth(1)?.split(')').next()?;
                Some((id.to_string(), header.contains("(yours)"), body.to_string()))
            })
            .collect()
    }

    #[async_trait]
    impl MemberGateway for ScriptedGateway {
        fn member_id(&self) -> &MemberId {
            &self.id
        }

        async fn respond(
            &self,
            _prompt: &str,
            context: Option<&str>,
        ) -> Result<String, GatewayError> {
            if let Some(ctx) = context {
                self.contexts.lock().unwrap().push(ctx.to_string());
                for (id, yours, _) in parse_blocks(ctx) {
                    if yours {
                        *self.own_id.lock().unwrap() = Some(id);
                    }
                }
            }

            let step = self.script.lock().unwrap().pop_front();
            match step {
                None => Err(GatewayError::Transport("script exhausted".into())),
                Some(Step::Reply(s)) => Ok(s.to_string()),
                Some(Step::FailFatal) => Err(GatewayError::Authentication("bad key".into())),
                Some(Step::FailTransient) => {
                    Err(GatewayError::Transport("connection reset".into()))
                }
                Some(Step::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(GatewayError::Timeout)
                }
                Some(Step::VoteForText(needle)) => {
                    let target = context.and_then(|ctx| {
                        parse_blocks(ctx)
                            .into_iter()
                            .find(|(_, _, text)| text.contains(needle))
                            .map(|(id, _, _)| id)
                    });
                    match target {
                        Some(id) => Ok(format!("I vote for {id}")),
                        None => Ok("none of these convinced me".to_string()),
                    }
                }
                Some(Step::VoteForOwn) => {
                    let own = self.own_id.lock().unwrap().clone().unwrap_or_default();
                    Ok(format!("I vote for {own}"))
                }
            }
        }

        async fn health_check(&self) -> bool {
            self.healthy
        }
    }

    fn council(members: Vec<Arc<ScriptedGateway>>) -> RunDeliberationUseCase {
        RunDeliberationUseCase::new(
            members
                .into_iter()
                .map(|g| g as Arc<dyn MemberGateway>)
                .collect(),
        )
    }

    fn fast_config(rounds: usize) -> DeliberationConfig {
        DeliberationConfig::default()
            .with_discussion_rounds(rounds)
            .with_per_call_timeout(Duration::from_millis(50))
            .with_max_retries(0)
            .with_initial_backoff(Duration::from_millis(1))
    }

    fn input(rounds: usize) -> DeliberationInput {
        DeliberationInput::new("Which deployment strategy should we use?", fast_config(rounds))
    }

    #[tokio::test(start_paused = true)]
    async fn test_majority_wins_with_zero_rounds() {
        // Scenario: a votes for b's opinion, b and c vote for a's.
        let a = ScriptedGateway::new("a", vec![Step::Reply("plan-a"), Step::VoteForText("plan-b")]);
        let b = ScriptedGateway::new("b", vec![Step::Reply("plan-b"), Step::VoteForText("plan-a")]);
        let c = ScriptedGateway::new("c", vec![Step::Reply("plan-c"), Step::VoteForText("plan-a")]);

        let verdict = council(vec![a, b, c]).execute(input(0)).await.unwrap();

        assert_eq!(verdict.winning_member, MemberId::new("a"));
        assert_eq!(verdict.winning_text, "plan-a");
        assert_eq!(verdict.total_votes, 3);
        assert_eq!(verdict.vote_counts[&verdict.winning_anonymous_id], 2);
        assert!(verdict.excluded.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_survivors_finish_after_permanent_failures() {
        // 5 members, 2 rounds; two fail permanently after round 0.
        let m1 = ScriptedGateway::new(
            "m1",
            vec![
                Step::Reply("plan-one"),
                Step::Reply("plan-one r1"),
                Step::Reply("plan-one r2"),
                Step::VoteForText("plan-two"),
            ],
        );
        let m2 = ScriptedGateway::new(
            "m2",
            vec![
                Step::Reply("plan-two"),
                Step::Reply("plan-two r1"),
                Step::Reply("plan-two r2"),
                Step::VoteForText("plan-one"),
            ],
        );
        let m3 = ScriptedGateway::new(
            "m3",
            vec![
                Step::Reply("plan-three"),
                Step::Reply("plan-three r1"),
                Step::Reply("plan-three r2"),
                Step::VoteForText("plan-one"),
            ],
        );
        let m4 = ScriptedGateway::new("m4", vec![Step::Reply("plan-four"), Step::FailFatal]);
        let m5 = ScriptedGateway::new("m5", vec![Step::Reply("plan-five"), Step::FailFatal]);

        let verdict = council(vec![m1, m2, m3, m4, m5])
            .execute(input(2))
            .await
            .unwrap();

        assert_eq!(verdict.winning_text, "plan-one r2");
        assert_eq!(verdict.total_votes, 3);
        assert_eq!(verdict.excluded.len(), 2);

        // Round 0 has all five opinions; later rounds only the survivors.
        assert_eq!(verdict.opinions_by_round[0].opinions.len(), 5);
        assert_eq!(verdict.opinions_by_round[1].opinions.len(), 3);
        assert_eq!(verdict.opinions_by_round[2].opinions.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_member_succeeding_after_retry_is_degraded_not_excluded() {
        let a = ScriptedGateway::new("a", vec![Step::Reply("plan-a"), Step::VoteForText("plan-b")]);
        // b's first opinion call fails transiently; the retry answers.
        let b = ScriptedGateway::new(
            "b",
            vec![
                Step::FailTransient,
                Step::Reply("plan-b"),
                Step::VoteForText("plan-a"),
            ],
        );
        let c = ScriptedGateway::new("c", vec![Step::Reply("plan-c"), Step::VoteForText("plan-a")]);

        let config = fast_config(0).with_max_retries(1);
        let verdict = council(vec![a, b, c])
            .execute(DeliberationInput::new("q?", config))
            .await
            .unwrap();

        assert_eq!(verdict.degraded, vec![MemberId::new("b")]);
        assert!(verdict.excluded.is_empty());
        // The degraded member's opinion and vote both still count.
        assert_eq!(verdict.total_votes, 3);
        assert_eq!(verdict.opinions_by_round[0].opinions.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_member_excluded_but_session_proceeds() {
        let a = ScriptedGateway::new("a", vec![Step::Reply("plan-a"), Step::VoteForText("plan-b")]);
        let b = ScriptedGateway::new("b", vec![Step::Reply("plan-b"), Step::VoteForText("plan-a")]);
        let c = ScriptedGateway::new("c", vec![Step::Hang]);

        let verdict = council(vec![a, b, c]).execute(input(0)).await.unwrap();

        assert_eq!(verdict.excluded.len(), 1);
        assert_eq!(verdict.excluded[0].member, MemberId::new("c"));
        assert_eq!(verdict.total_votes, 2);
        // One vote each: tie broken to the lexicographically smallest
        // member id, so a's opinion wins.
        assert_eq!(verdict.winning_member, MemberId::new("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quorum_loss_at_collection_fails_session() {
        let a = ScriptedGateway::new("a", vec![Step::Reply("plan-a")]);
        let b = ScriptedGateway::new("b", vec![Step::Reply("plan-b")]);
        let c = ScriptedGateway::new("c", vec![Step::Hang]);

        let config = fast_config(0).with_min_quorum(3);
        let report = council(vec![a, b, c])
            .execute(DeliberationInput::new("q?", config))
            .await
            .unwrap_err();

        assert_eq!(
            report.error,
            DeliberationError::InsufficientMembers { have: 2, need: 3 }
        );
        assert_eq!(report.phase, Phase::Collecting);
        // Partial history is surfaced for diagnostics.
        assert_eq!(report.opinions_by_round.len(), 1);
        assert_eq!(report.opinions_by_round[0].opinions.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_self_vote_is_invalid_but_session_proceeds() {
        // One discussion round so "a" learns its own anonymous id from
        // the "(yours)" tag, then votes for itself.
        let a = ScriptedGateway::new(
            "a",
            vec![Step::Reply("plan-a"), Step::Reply("plan-a r1"), Step::VoteForOwn],
        );
        let b = ScriptedGateway::new(
            "b",
            vec![
                Step::Reply("plan-b"),
                Step::Reply("plan-b r1"),
                Step::VoteForText("plan-a"),
            ],
        );
        let c = ScriptedGateway::new(
            "c",
            vec![
                Step::Reply("plan-c"),
                Step::Reply("plan-c r1"),
                Step::VoteForText("plan-a"),
            ],
        );

        let verdict = council(vec![a, b, c]).execute(input(1)).await.unwrap();

        assert_eq!(verdict.invalid_votes, 1);
        assert_eq!(verdict.total_votes, 2);
        assert_eq!(verdict.winning_member, MemberId::new("a"));
        assert!(verdict.excluded.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_member_opinion_carries_into_later_rounds_and_voting() {
        let a = ScriptedGateway::new(
            "a",
            vec![
                Step::Reply("plan-a"),
                Step::Reply("plan-a r1"),
                Step::Reply("plan-a r2"),
                Step::VoteForText("plan-b r1"),
            ],
        );
        // b succeeds in round 1, fails in round 2.
        let b = ScriptedGateway::new(
            "b",
            vec![Step::Reply("plan-b"), Step::Reply("plan-b r1"), Step::Hang],
        );
        let c = ScriptedGateway::new(
            "c",
            vec![
                Step::Reply("plan-c"),
                Step::Reply("plan-c r1"),
                Step::Reply("plan-c r2"),
                Step::VoteForText("plan-b r1"),
            ],
        );

        let a_ref = Arc::clone(&a);
        let verdict = council(vec![a, b, c]).execute(input(2)).await.unwrap();

        // a saw contexts for round 1, round 2, and voting. b's round-1
        // revision must appear unchanged in the round-2 presentation and
        // in the voting choices.
        let contexts = a_ref.contexts();
        assert_eq!(contexts.len(), 3);
        assert!(contexts[1].contains("plan-b r1"));
        assert!(contexts[2].contains("plan-b r1"));

        // And votes for the carried-forward opinion count.
        assert_eq!(verdict.winning_text, "plan-b r1");
        assert_eq!(verdict.winning_member, MemberId::new("b"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_abstentions_fail_with_insufficient_votes() {
        let a = ScriptedGateway::new("a", vec![Step::Reply("plan-a"), Step::Reply("no vote")]);
        let b = ScriptedGateway::new("b", vec![Step::Reply("plan-b"), Step::Reply("pass")]);
        let c = ScriptedGateway::new("c", vec![Step::Reply("plan-c"), Step::Hang]);

        let report = council(vec![a, b, c]).execute(input(0)).await.unwrap_err();

        assert_eq!(
            report.error,
            DeliberationError::InsufficientVotes { have: 0, need: 2 }
        );
        assert_eq!(report.phase, Phase::Voting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unhealthy_member_filtered_before_collection() {
        let a = ScriptedGateway::new("a", vec![Step::Reply("plan-a"), Step::VoteForText("plan-b")]);
        let b = ScriptedGateway::new("b", vec![Step::Reply("plan-b"), Step::VoteForText("plan-a")]);
        let c = ScriptedGateway::unhealthy("c");

        let verdict = council(vec![a, b, c]).execute(input(0)).await.unwrap();

        assert_eq!(verdict.excluded.len(), 1);
        assert_eq!(verdict.excluded[0].member, MemberId::new("c"));
        assert_eq!(verdict.excluded[0].reason, "health check failed");
        // The unhealthy member never contributed an opinion.
        assert_eq!(verdict.opinions_by_round[0].opinions.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_anonymous_ids_are_a_bijection_over_contributors() {
        let a = ScriptedGateway::new("a", vec![Step::Reply("plan-a"), Step::VoteForText("plan-b")]);
        let b = ScriptedGateway::new("b", vec![Step::Reply("plan-b"), Step::VoteForText("plan-a")]);
        let c = ScriptedGateway::new("c", vec![Step::Reply("plan-c"), Step::VoteForText("plan-a")]);

        let verdict = council(vec![a, b, c]).execute(input(0)).await.unwrap();

        let round0 = &verdict.opinions_by_round[0].opinions;
        let anon_ids: BTreeSet<_> = round0.iter().map(|o| &o.anonymous_id).collect();
        let members: BTreeSet<_> = round0.iter().map(|o| &o.member).collect();
        assert_eq!(anon_ids.len(), 3);
        assert_eq!(members.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_verdict_serializes_and_reparses_identically() {
        let a = ScriptedGateway::new("a", vec![Step::Reply("plan-a"), Step::VoteForText("plan-b")]);
        let b = ScriptedGateway::new("b", vec![Step::Reply("plan-b"), Step::VoteForText("plan-a")]);
        let c = ScriptedGateway::new("c", vec![Step::Reply("plan-c"), Step::VoteForText("plan-a")]);

        let verdict = council(vec![a, b, c]).execute(input(0)).await.unwrap();

        let json = serde_json::to_string_pretty(&verdict).unwrap();
        let reparsed: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, verdict);
    }
}
