//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the config file and
//! convert into the application-layer [`DeliberationConfig`].
//!
//! Example configuration:
//!
//! ```toml
//! [deliberation]
//! discussion_rounds = 2
//! min_quorum = 2
//! per_call_timeout_seconds = 60
//! max_retries = 3
//!
//! [[members]]
//! name = "mistral"
//! model = "mistral:7b"
//!
//! [[members]]
//! name = "llama"
//! model = "llama3:8b"
//! base_url = "http://gpu-box:11434"
//! ```

use council_application::{DeliberationConfig, VotingMode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Deliberation settings from TOML (`[deliberation]` section)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDeliberationConfig {
    /// Discussion rounds between collection and voting
    pub discussion_rounds: usize,
    /// Minimum contributing members / valid votes
    pub min_quorum: usize,
    /// Timeout per member call attempt, in seconds
    pub per_call_timeout_seconds: u64,
    /// Retries per call after the first attempt
    pub max_retries: usize,
    /// Optional overall deadline per phase, in seconds
    pub phase_deadline_seconds: Option<u64>,
    /// Vote counting mode
    pub voting_mode: VotingMode,
}

impl Default for FileDeliberationConfig {
    fn default() -> Self {
        Self {
            discussion_rounds: 2,
            min_quorum: 2,
            per_call_timeout_seconds: 60,
            max_retries: 3,
            phase_deadline_seconds: None,
            voting_mode: VotingMode::default(),
        }
    }
}

/// One member entry from TOML (`[[members]]`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMemberConfig {
    /// Stable member name; doubles as the member id
    pub name: String,
    /// Ollama model identifier (e.g., "mistral:7b")
    pub model: String,
    /// Ollama endpoint; defaults to the local instance
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Deliberation settings
    pub deliberation: FileDeliberationConfig,
    /// Participating members
    pub members: Vec<FileMemberConfig>,
}

impl FileConfig {
    /// Convert the raw file values into the application-layer config
    pub fn deliberation_config(&self) -> DeliberationConfig {
        DeliberationConfig::default()
            .with_discussion_rounds(self.deliberation.discussion_rounds)
            .with_min_quorum(self.deliberation.min_quorum)
            .with_per_call_timeout(Duration::from_secs(
                self.deliberation.per_call_timeout_seconds,
            ))
            .with_max_retries(self.deliberation.max_retries)
            .with_phase_deadline(
                self.deliberation
                    .phase_deadline_seconds
                    .map(Duration::from_secs),
            )
            .with_voting_mode(self.deliberation.voting_mode)
    }
}
