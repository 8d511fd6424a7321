//! Console output formatting for verdicts

use colored::Colorize;
use council_application::FailureReport;
use council_domain::Verdict;

/// Formats verdicts for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete verdict with per-round opinion history
    pub fn format(verdict: &Verdict) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("LLM Council Verdict"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n\n",
            "Question:".cyan().bold(),
            verdict.question
        ));

        for round in &verdict.opinions_by_round {
            let title = if round.round == 0 {
                "Initial opinions".to_string()
            } else {
                format!("Discussion round {}", round.round)
            };
            output.push_str(&Self::section_header(&title));
            for opinion in &round.opinions {
                output.push_str(&format!(
                    "\n{}\n{}\n",
                    format!("── {} ({}) ──", opinion.anonymous_id, opinion.member)
                        .yellow()
                        .bold(),
                    opinion.text
                ));
            }
        }

        output.push_str(&Self::section_header("Votes"));
        for (anon_id, count) in &verdict.vote_counts {
            output.push_str(&format!("  {}: {}\n", anon_id, count));
        }
        if verdict.invalid_votes > 0 {
            output.push_str(&format!("  invalid: {}\n", verdict.invalid_votes));
        }
        if verdict.abstentions > 0 {
            output.push_str(&format!("  abstained: {}\n", verdict.abstentions));
        }

        if !verdict.degraded.is_empty() {
            output.push_str(&format!(
                "\n{} {}\n",
                "Degraded (needed retries):".yellow().bold(),
                verdict
                    .degraded
                    .iter()
                    .map(|m| m.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        if !verdict.excluded.is_empty() {
            output.push_str(&Self::section_header("Excluded members"));
            for excluded in &verdict.excluded {
                output.push_str(&format!(
                    "  {} {}: {}\n",
                    "x".red(),
                    excluded.member,
                    excluded.reason
                ));
            }
        }

        output.push_str(&Self::section_header("Winning opinion"));
        output.push_str(&format!(
            "\n{}\n\n{}\n",
            format!(
                "{} (was {})",
                verdict.winning_member, verdict.winning_anonymous_id
            )
            .green()
            .bold(),
            verdict.winning_text
        ));

        output
    }

    /// Format as JSON
    pub fn format_json(verdict: &Verdict) -> String {
        serde_json::to_string_pretty(verdict).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the winning opinion only (concise output)
    pub fn format_summary(verdict: &Verdict) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Council Verdict ===".cyan().bold()
        ));

        output.push_str(&format!("{} {}\n\n", "Q:".bold(), verdict.question));

        let counts = verdict
            .vote_counts
            .iter()
            .map(|(id, n)| format!("{id} {n}"))
            .collect::<Vec<_>>()
            .join(", ");
        output.push_str(&format!(
            "{} {} of {} votes ({})\n\n",
            "Winner:".dimmed(),
            verdict.winning_member.to_string().green().bold(),
            verdict.total_votes,
            counts
        ));

        output.push_str(&verdict.winning_text);
        output.push('\n');

        output
    }

    /// Format a terminal failure with whatever history was collected
    pub fn format_failure(report: &FailureReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}\n",
            "Deliberation failed:".red().bold(),
            report.error
        ));
        output.push_str(&format!("  phase: {}\n", report.phase));
        if report.error.is_quorum_loss() {
            output.push_str(
                "  the council fell below quorum; check member availability or lower min_quorum\n",
            );
        }

        if !report.excluded.is_empty() {
            output.push_str("  excluded members:\n");
            for excluded in &report.excluded {
                output.push_str(&format!("    {}: {}\n", excluded.member, excluded.reason));
            }
        }

        let recorded: usize = report.opinions_by_round.iter().map(|r| r.opinions.len()).sum();
        if recorded > 0 {
            output.push_str(&format!(
                "  {} opinion(s) across {} round(s) were collected before the failure\n",
                recorded,
                report.opinions_by_round.len()
            ));
        }

        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{DeliberationError, Phase};

    fn failure(error: DeliberationError) -> FailureReport {
        FailureReport {
            error,
            phase: Phase::Collecting,
            opinions_by_round: vec![],
            excluded: vec![],
        }
    }

    #[test]
    fn test_quorum_loss_failure_carries_a_hint() {
        let out = ConsoleFormatter::format_failure(&failure(
            DeliberationError::InsufficientMembers { have: 1, need: 2 },
        ));
        assert!(out.contains("fell below quorum"));
    }

    #[test]
    fn test_aborted_failure_has_no_quorum_hint() {
        let out = ConsoleFormatter::format_failure(&failure(DeliberationError::SessionAborted(
            "illegal phase transition".into(),
        )));
        assert!(!out.contains("fell below quorum"));
        assert!(out.contains("phase: collecting"));
    }
}
