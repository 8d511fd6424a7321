//! Ollama adapter

mod gateway;

pub use gateway::OllamaGateway;
