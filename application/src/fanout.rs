//! Phase fan-out / fan-in
//!
//! Each phase issues all its per-member calls in parallel and waits for
//! every outcome before advancing; there is no partial advancement on
//! first completion. Outcomes land in a `BTreeMap`, so the order members
//! happen to respond in carries no signal downstream.

use crate::ports::member_gateway::{GatewayError, MemberGateway};
use crate::retry::{CallReply, RetryPolicy, call_with_retry};
use council_domain::MemberId;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::warn;

/// One member's request within a phase
pub struct MemberCall {
    pub prompt: String,
    pub context: Option<String>,
}

impl MemberCall {
    pub fn new(prompt: impl Into<String>, context: Option<String>) -> Self {
        Self {
            prompt: prompt.into(),
            context,
        }
    }
}

/// Fan a set of member calls out in parallel and collect every outcome.
///
/// Each call runs in its own task with its own timeout/retry chain, so
/// one member's backoff never blocks another. If `deadline` expires,
/// still-outstanding tasks are cancelled and those members get a
/// `Timeout` outcome; already-completed results are kept.
pub async fn fan_out(
    gateways: &BTreeMap<MemberId, Arc<dyn MemberGateway>>,
    calls: BTreeMap<MemberId, MemberCall>,
    policy: RetryPolicy,
    deadline: Option<Duration>,
) -> BTreeMap<MemberId, Result<CallReply, GatewayError>> {
    let members: Vec<MemberId> = calls.keys().cloned().collect();
    let mut join_set = JoinSet::new();

    for (member, call) in calls {
        let Some(gateway) = gateways.get(&member) else {
            warn!(%member, "no gateway for member; call not issued");
            continue;
        };
        let gateway = Arc::clone(gateway);

        join_set.spawn(async move {
            let result = call_with_retry(
                gateway.as_ref(),
                &call.prompt,
                call.context.as_deref(),
                &policy,
            )
            .await;
            (member, result)
        });
    }

    let mut outcomes = BTreeMap::new();

    match deadline {
        Some(limit) => {
            if tokio::time::timeout(limit, drain(&mut join_set, &mut outcomes))
                .await
                .is_err()
            {
                warn!("phase deadline exceeded; cancelling outstanding member calls");
                join_set.abort_all();
                while join_set.join_next().await.is_some() {}
            }
        }
        None => drain(&mut join_set, &mut outcomes).await,
    }

    // Cancelled or never-spawned members count as timed out for this phase.
    for member in members {
        outcomes
            .entry(member)
            .or_insert(Err(GatewayError::Timeout));
    }

    outcomes
}

async fn drain(
    join_set: &mut JoinSet<(MemberId, Result<CallReply, GatewayError>)>,
    outcomes: &mut BTreeMap<MemberId, Result<CallReply, GatewayError>>,
) {
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok((member, outcome)) => {
                outcomes.insert(member, outcome);
            }
            Err(e) => warn!("member task join error: {e}"),
        }
    }
}
