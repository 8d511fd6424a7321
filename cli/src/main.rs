//! CLI entrypoint for llm-council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod args;
mod output;
mod progress;

use anyhow::{Context, Result, bail};
use args::{Cli, OutputFormat};
use clap::Parser;
use council_application::ports::member_gateway::MemberGateway;
use council_application::{DeliberationInput, RunDeliberationUseCase};
use council_application::ports::verdict_store::VerdictStore;
use council_domain::{MemberId, Question};
use council_infrastructure::{ConfigLoader, JsonVerdictStore, OllamaGateway};
use output::ConsoleFormatter;
use progress::ProgressReporter;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting llm-council");

    // Load configuration (defaults <- council.toml <- --config <- env)
    let file_config = ConfigLoader::load(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to load configuration")?;

    if file_config.members.len() < 2 {
        bail!(
            "a council needs at least 2 configured members, found {}. \
             Add [[members]] entries to council.toml.",
            file_config.members.len()
        );
    }

    let mut config = file_config.deliberation_config();
    if let Some(rounds) = cli.rounds {
        config = config.with_discussion_rounds(rounds);
    }
    if let Some(quorum) = cli.quorum {
        config = config.with_min_quorum(quorum);
    }

    let question = match Question::try_new(&cli.question) {
        Some(q) => q,
        None => bail!("question cannot be empty"),
    };

    // === Dependency Injection ===
    // Create one Ollama gateway per configured member
    let gateways: Vec<Arc<dyn MemberGateway>> = file_config
        .members
        .iter()
        .map(|m| {
            Arc::new(OllamaGateway::new(
                MemberId::new(&m.name),
                &m.model,
                &m.base_url,
            )) as Arc<dyn MemberGateway>
        })
        .collect();

    // Print header
    if !cli.quiet {
        println!();
        println!("Question: {}", question);
        println!(
            "Members: {}",
            file_config
                .members
                .iter()
                .map(|m| format!("{} ({})", m.name, m.model))
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
    }

    // Create use case with injected gateways
    let use_case = RunDeliberationUseCase::new(gateways);
    let input = DeliberationInput::new(question, config);

    // Execute with or without progress reporting
    let result = if cli.quiet {
        use_case.execute(input).await
    } else {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await
    };

    let verdict = match result {
        Ok(verdict) => verdict,
        Err(report) => {
            eprintln!("{}", ConsoleFormatter::format_failure(&report));
            std::process::exit(1);
        }
    };

    // Output results
    let formatted = match cli.output {
        OutputFormat::Full => ConsoleFormatter::format(&verdict),
        OutputFormat::Summary => ConsoleFormatter::format_summary(&verdict),
        OutputFormat::Json => ConsoleFormatter::format_json(&verdict),
    };

    println!("{}", formatted);

    if !cli.no_save {
        let store = JsonVerdictStore::new(&cli.results_dir);
        let path = store.save(&verdict).context("failed to save verdict")?;
        if !cli.quiet {
            println!("Verdict saved to {}", path.display());
        }
    }

    Ok(())
}
