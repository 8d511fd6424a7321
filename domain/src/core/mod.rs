//! Core domain types shared across modules

pub mod error;
pub mod question;

pub use error::DeliberationError;
pub use question::Question;
