//! Configuration loading

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileDeliberationConfig, FileMemberConfig};
pub use loader::ConfigLoader;
