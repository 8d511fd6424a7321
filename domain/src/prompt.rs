//! Prompt templates for the deliberation flow

use crate::anonymizer::{AnonymousId, Presented};

/// Templates for the prompts sent to members at each phase
pub struct PromptTemplate;

impl PromptTemplate {
    /// Prompt for the initial opinion phase
    pub fn opinion_prompt(question: &str) -> String {
        format!(
            r#"You are a member of a council. Provide your thoughtful opinion on the following question.
Be concise but comprehensive. Your response will be shared anonymously with the other council members.

Question:
{question}"#
        )
    }

    /// Prompt for a discussion round; the anonymized opinions travel in
    /// the call's context argument
    pub fn revision_prompt(question: &str) -> String {
        format!(
            r#"You are a member of a council reviewing anonymous opinions from the other members.
The opinion marked "yours" is your own previous answer. Consider the other opinions critically,
then produce a revised version of your own opinion. Reply with the revised opinion text only.

Question:
{question}"#
        )
    }

    /// Prompt for the voting phase; the choices travel in the call's
    /// context argument
    pub fn voting_prompt(question: &str) -> String {
        format!(
            r#"You are a member of a council. Vote for the ONE anonymous opinion that best answers
the question. You cannot vote for your own opinion; it is not listed among the choices.
Reply in the form "I vote for [Opinion ID]" or just the Opinion ID.

Question:
{question}"#
        )
    }

    /// Render a set of anonymized opinions as call context.
    ///
    /// When `own` is the member's id, its opinion is tagged "(yours)" so
    /// it can recognize its own thread without anyone else being named.
    pub fn presentation_block(presented: &[Presented], own: Option<&AnonymousId>) -> String {
        presented
            .iter()
            .map(|p| {
                let tag = if own == Some(&p.anonymous_id) {
                    " (yours)"
                } else {
                    ""
                };
                format!("Opinion (ID: {}){}:\n{}", p.anonymous_id, tag, p.text)
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Extract the anonymous id a free-form vote response names.
///
/// Scans the response for each candidate id and returns the one that
/// appears earliest. Returns `None` when no candidate is named: an
/// unparseable vote is an abstention, never a guessed vote.
pub fn extract_ballot_target(response: &str, choices: &[AnonymousId]) -> Option<AnonymousId> {
    let lowered = response.to_lowercase();

    choices
        .iter()
        .filter_map(|id| {
            lowered
                .find(&id.as_str().to_lowercase())
                .map(|pos| (pos, id))
        })
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, id)| id.clone())
}
