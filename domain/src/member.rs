//! Member identity and per-session health

use serde::{Deserialize, Serialize};

/// Stable identity of a deliberation member (Value Object)
///
/// The id is the member's configured name (e.g., "mistral", "llama3").
/// `Ord` matters here: vote ties are broken by the lexicographically
/// smallest member id, so ordering must be stable and total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MemberId {
    fn from(s: &str) -> Self {
        MemberId::new(s)
    }
}

/// Per-session health status of a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberHealth {
    /// Responding normally
    Healthy,
    /// Had retryable trouble but is still participating
    Degraded,
    /// No longer asked to participate in later phases
    Excluded,
}

/// A participating member for the lifetime of one session (Entity)
///
/// Owned by the coordinator; never exposed to other members.
#[derive(Debug, Clone)]
pub struct Member {
    id: MemberId,
    health: MemberHealth,
    exclusion_reason: Option<String>,
}

impl Member {
    pub fn new(id: MemberId) -> Self {
        Self {
            id,
            health: MemberHealth::Healthy,
            exclusion_reason: None,
        }
    }

    pub fn id(&self) -> &MemberId {
        &self.id
    }

    pub fn health(&self) -> &MemberHealth {
        &self.health
    }

    /// Whether this member is still asked to participate in phases
    pub fn is_active(&self) -> bool {
        !matches!(self.health, MemberHealth::Excluded)
    }

    pub fn mark_degraded(&mut self) {
        if self.health == MemberHealth::Healthy {
            self.health = MemberHealth::Degraded;
        }
    }

    /// Exclude this member from all later phases, recording why.
    ///
    /// Idempotent: the first recorded reason wins.
    pub fn exclude(&mut self, reason: impl Into<String>) {
        if self.health != MemberHealth::Excluded {
            self.health = MemberHealth::Excluded;
            self.exclusion_reason = Some(reason.into());
        }
    }

    pub fn exclusion_reason(&self) -> Option<&str> {
        self.exclusion_reason.as_deref()
    }
}
