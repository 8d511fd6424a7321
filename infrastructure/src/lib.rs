//! Infrastructure layer for llm-council
//!
//! Concrete adapters behind the application layer's ports: the Ollama
//! member gateway, the TOML configuration loader, and the JSON verdict
//! store.

pub mod config;
pub mod ollama;
pub mod persistence;

pub use config::{ConfigLoader, FileConfig, FileDeliberationConfig, FileMemberConfig};
pub use ollama::OllamaGateway;
pub use persistence::JsonVerdictStore;
