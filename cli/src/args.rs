//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the final verdict
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Full output with per-round opinions
    Full,
    /// Only the winning opinion and vote counts
    Summary,
    /// JSON output
    Json,
}

/// CLI arguments for llm-council
#[derive(Parser, Debug)]
#[command(name = "llm-council")]
#[command(author, version, about = "A council of LLMs deliberates anonymously and votes")]
#[command(long_about = r#"
llm-council puts a question to a panel of local models, runs anonymous
discussion rounds where each member sees the others' opinions without
attribution, then holds a vote and reports the winning opinion.

The process:
1. Collection: every member answers the question in parallel
2. Discussion: members revise their opinions after reading the others'
3. Voting: each member votes for the most convincing opinion (not its own)
4. Tally: votes are counted and the winner is unmasked

Configuration files are loaded from (in priority order):
1. --config <path>   Explicit config file
2. ./council.toml    Project-level config
3. LLM_COUNCIL_* environment variables

Example:
  llm-council "Should we migrate the cache layer to Redis?"
  llm-council --rounds 1 --quorum 3 "Pick a serialization format"
"#)]
pub struct Cli {
    /// The question to put before the council
    pub question: String,

    /// Number of discussion rounds (overrides the config file)
    #[arg(short, long, value_name = "N")]
    pub rounds: Option<usize>,

    /// Minimum members that must survive each phase (overrides the config file)
    #[arg(long, value_name = "N")]
    pub quorum: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// Directory for saved verdict files
    #[arg(long, value_name = "DIR", default_value = "results")]
    pub results_dir: PathBuf,

    /// Skip writing the verdict file
    #[arg(long)]
    pub no_save: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
