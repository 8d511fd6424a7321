//! Use cases

pub mod run_deliberation;

pub use run_deliberation::{DeliberationInput, FailureReport, RunDeliberationUseCase};
