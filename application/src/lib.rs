//! Application layer for llm-council
//!
//! This crate defines the ports (interfaces to the outside world) and
//! the deliberation coordinator use case. Concrete gateway and storage
//! adapters live in the infrastructure layer.

pub mod config;
pub mod fanout;
pub mod ports;
pub mod retry;
pub mod use_cases;

// Re-export main types
pub use config::{DeliberationConfig, VotingMode};
pub use ports::member_gateway::{GatewayError, MemberGateway};
pub use ports::progress::{DeliberationProgress, NoProgress};
pub use ports::verdict_store::{StoreError, VerdictStore};
pub use retry::{CallReply, RetryPolicy};
pub use use_cases::run_deliberation::{
    DeliberationInput, FailureReport, RunDeliberationUseCase,
};
