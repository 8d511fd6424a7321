//! Member Gateway port
//!
//! Defines the uniform capability wrapper around one text-generation
//! backend. Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use council_domain::MemberId;
use thiserror::Error;

/// Errors that can occur during a member gateway call
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("empty response")]
    EmptyResponse,

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: usize, last: String },
}

impl GatewayError {
    /// Whether the retry loop should attempt this call again.
    ///
    /// Timeouts, transient transport errors, and rate limits are
    /// retryable; everything else fails the call immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout | GatewayError::Transport(_) | GatewayError::RateLimited(_)
        )
    }
}

/// Gateway to one deliberation member's backend
///
/// A call either returns non-empty text or fails with a classified
/// error; it never returns partial output. The gateway has no side
/// effects beyond the outbound call.
#[async_trait]
pub trait MemberGateway: Send + Sync {
    /// The stable identity of the member behind this gateway
    fn member_id(&self) -> &MemberId;

    /// Ask the member to respond to a prompt, with optional context
    /// (e.g., the anonymized opinions of the current round)
    async fn respond(&self, prompt: &str, context: Option<&str>) -> Result<String, GatewayError>;

    /// Whether the backend looks reachable; used at session start to
    /// pre-filter unavailable members
    async fn health_check(&self) -> bool;
}
