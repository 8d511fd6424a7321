//! Anonymization of member contributions
//!
//! Each member's opinions are published under an opaque id that stays
//! stable for the whole session, so members can recognize and revise
//! "their own" opinion thread without learning whose the others are.
//! Presentation order is reshuffled on every call so position carries
//! no signal either.

use crate::member::MemberId;
use crate::opinion::Opinion;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Opaque id a member's contributions are published under (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnonymousId(String);

impl AnonymousId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AnonymousId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One opinion as shown to members: anonymous id plus text, nothing else
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presented {
    pub anonymous_id: AnonymousId,
    pub text: String,
}

/// Assigns and remembers anonymous ids for one session.
///
/// The owner -> id mapping is a bijection for the session's lifetime
/// and is never reused across sessions (one `Anonymizer` per session).
#[derive(Debug, Default)]
pub struct Anonymizer {
    assigned: BTreeMap<MemberId, AnonymousId>,
    used: BTreeSet<AnonymousId>,
}

impl Anonymizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an anonymous id to a member, or return the one it already has.
    ///
    /// Idempotent per owner: repeated calls return the same id, which is
    /// what keeps a member's opinion thread stable across rounds.
    pub fn assign(&mut self, owner: &MemberId) -> AnonymousId {
        if let Some(id) = self.assigned.get(owner) {
            return id.clone();
        }

        let id = loop {
            let candidate = Self::generate_id();
            if !self.used.contains(&candidate) {
                break candidate;
            }
        };

        self.used.insert(id.clone());
        self.assigned.insert(owner.clone(), id.clone());
        id
    }

    /// Look up the anonymous id a member was assigned, if any
    pub fn id_of(&self, owner: &MemberId) -> Option<&AnonymousId> {
        self.assigned.get(owner)
    }

    /// Resolve an anonymous id back to its owner.
    ///
    /// Used only at final result assembly and for vote validation;
    /// never exposed to members during rounds.
    pub fn resolve(&self, anonymous_id: &AnonymousId) -> Option<&MemberId> {
        self.assigned
            .iter()
            .find(|(_, id)| *id == anonymous_id)
            .map(|(owner, _)| owner)
    }

    /// The full anonymous id -> owner mapping, for tallying
    pub fn owners(&self) -> BTreeMap<AnonymousId, MemberId> {
        self.assigned
            .iter()
            .map(|(owner, id)| (id.clone(), owner.clone()))
            .collect()
    }

    /// Number of members with an assigned id
    pub fn assigned_count(&self) -> usize {
        self.assigned.len()
    }

    /// Build the shuffled presentation of a set of opinions.
    ///
    /// A fresh shuffle per call: the relative order members see never
    /// correlates with identity or with the previous round.
    pub fn present(&self, opinions: &[Opinion]) -> Vec<Presented> {
        let mut presented: Vec<Presented> = opinions
            .iter()
            .map(|op| Presented {
                anonymous_id: op.anonymous_id.clone(),
                text: op.text.clone(),
            })
            .collect();

        presented.shuffle(&mut rand::thread_rng());
        presented
    }

    fn generate_id() -> AnonymousId {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(4)
            .map(|b| (b as char).to_ascii_uppercase())
            .collect();
        AnonymousId(format!("Councilor-{suffix}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opinion::Opinion;

    #[test]
    fn test_assign_is_idempotent_per_owner() {
        let mut anon = Anonymizer::new();
        let owner = MemberId::new("mistral");

        let first = anon.assign(&owner);
        let second = anon.assign(&owner);
        assert_eq!(first, second);
        assert_eq!(anon.assigned_count(), 1);
    }

    #[test]
    fn test_mapping_is_a_bijection() {
        let mut anon = Anonymizer::new();
        let members: Vec<MemberId> = (0..20).map(|i| MemberId::new(format!("m{i}"))).collect();

        let ids: BTreeSet<AnonymousId> = members.iter().map(|m| anon.assign(m)).collect();
        assert_eq!(ids.len(), members.len());

        for member in &members {
            let id = anon.id_of(member).unwrap().clone();
            assert_eq!(anon.resolve(&id), Some(member));
        }
    }

    #[test]
    fn test_present_preserves_membership() {
        let mut anon = Anonymizer::new();
        let opinions: Vec<Opinion> = (0..5)
            .map(|i| {
                let owner = MemberId::new(format!("m{i}"));
                let id = anon.assign(&owner);
                Opinion::new(owner, id, 0, format!("text {i}"))
            })
            .collect();

        let presented = anon.present(&opinions);
        assert_eq!(presented.len(), opinions.len());

        let shown: BTreeSet<&AnonymousId> = presented.iter().map(|p| &p.anonymous_id).collect();
        let original: BTreeSet<&AnonymousId> = opinions.iter().map(|o| &o.anonymous_id).collect();
        assert_eq!(shown, original);
    }

    #[test]
    fn test_id_shape() {
        let mut anon = Anonymizer::new();
        let id = anon.assign(&MemberId::new("m"));
        let s = id.as_str();
        assert!(s.starts_with("Councilor-"));
        assert_eq!(s.len(), "Councilor-".len() + 4);
    }
}
