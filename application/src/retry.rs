//! Shared per-call timeout and retry plumbing
//!
//! Every member call in every phase goes through [`call_with_retry`]:
//! one bounded attempt, exponential backoff between retryable failures,
//! and escalation to a fatal error once the retry budget is spent.
//! Each member's call chain runs in its own task, so one member's
//! backoff never delays another.

use crate::ports::member_gateway::{GatewayError, MemberGateway};
use std::time::Duration;
use tracing::{debug, warn};

/// Parameters for one call's timeout/retry behavior
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub per_call_timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: usize,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            per_call_timeout: Duration::from_secs(60),
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry number `retry` (1-indexed): doubles each
    /// time, capped at `max_backoff`
    fn backoff_before(&self, retry: usize) -> Duration {
        let factor = 1u32 << (retry - 1).min(16);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// A successful gateway call, noting whether it needed retries.
///
/// The coordinator downgrades the member's health to degraded when
/// `retried` is set; a first-attempt success leaves it healthy.
#[derive(Debug)]
pub struct CallReply {
    pub text: String,
    pub retried: bool,
}

/// Call a member gateway with timeout, retry, and classification.
///
/// Returns the response text, or the final classified error: fatal
/// errors immediately, retryable ones as `RetriesExhausted` once the
/// budget is spent. A blank response is a fatal `EmptyResponse`.
pub async fn call_with_retry(
    gateway: &dyn MemberGateway,
    prompt: &str,
    context: Option<&str>,
    policy: &RetryPolicy,
) -> Result<CallReply, GatewayError> {
    let member = gateway.member_id().clone();
    let mut last_error: Option<GatewayError> = None;

    for attempt in 0..=policy.max_retries {
        if attempt > 0 {
            let backoff = policy.backoff_before(attempt);
            debug!(%member, attempt, ?backoff, "retrying member call");
            tokio::time::sleep(backoff).await;
        }

        let outcome = tokio::time::timeout(
            policy.per_call_timeout,
            gateway.respond(prompt, context),
        )
        .await;

        match outcome {
            Err(_) => {
                warn!(%member, attempt, "member call timed out");
                last_error = Some(GatewayError::Timeout);
            }
            Ok(Ok(text)) if text.trim().is_empty() => {
                warn!(%member, "member returned an empty response");
                return Err(GatewayError::EmptyResponse);
            }
            Ok(Ok(text)) => {
                return Ok(CallReply {
                    text,
                    retried: attempt > 0,
                });
            }
            Ok(Err(e)) if e.is_retryable() => {
                warn!(%member, attempt, error = %e, "retryable member failure");
                last_error = Some(e);
            }
            Ok(Err(e)) => {
                warn!(%member, error = %e, "fatal member failure");
                return Err(e);
            }
        }
    }

    let last = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "unknown".into());
    Err(GatewayError::RetriesExhausted {
        attempts: policy.max_retries + 1,
        last,
    })
}
