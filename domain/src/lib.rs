//! Domain layer for llm-council
//!
//! This crate contains the core deliberation logic: members, opinions,
//! anonymization, voting, the phase state machine, and the session entity.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Deliberation
//!
//! Several independent members answer the same question, iteratively
//! revise their answers while seeing each other's opinions anonymously,
//! and finally vote for the best answer.
//!
//! ## Anonymization
//!
//! Each member's contributions are published under a stable opaque id
//! for the lifetime of a session, so opinions can be revised and voted
//! on without reputation bias.

pub mod anonymizer;
pub mod ballot;
pub mod core;
pub mod member;
pub mod opinion;
pub mod phase;
pub mod prompt;
pub mod session;
pub mod util;
pub mod verdict;

// Re-export commonly used types
pub use anonymizer::{AnonymousId, Anonymizer, Presented};
pub use ballot::{Ballot, BallotOutcome, Tally, tally};
pub use core::{error::DeliberationError, question::Question};
pub use member::{Member, MemberHealth, MemberId};
pub use opinion::Opinion;
pub use phase::Phase;
pub use prompt::{PromptTemplate, extract_ballot_target};
pub use session::Session;
pub use verdict::{ExcludedMember, RecordedOpinion, RoundOpinions, Verdict};
