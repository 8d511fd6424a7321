//! Question value object

use serde::{Deserialize, Serialize};

/// The question a deliberation session is asked to answer (Value Object)
///
/// Guaranteed non-blank; surrounding whitespace is stripped on
/// construction so prompts and the verdict record carry the same text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    content: String,
}

impl Question {
    /// Create a question, returning `None` for blank input
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            content: trimmed.to_string(),
        })
    }

    /// Create a question from input known to be non-blank
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        match Self::try_new(content) {
            Some(question) => question,
            None => panic!("question cannot be empty"),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Question {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Question {
    fn from(s: &str) -> Self {
        Question::new(s)
    }
}

impl From<String> for Question {
    fn from(s: String) -> Self {
        Question::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrounding_whitespace_is_stripped() {
        let q = Question::new("  Should we adopt Rust?\n");
        assert_eq!(q.content(), "Should we adopt Rust?");
    }

    #[test]
    #[should_panic(expected = "question cannot be empty")]
    fn test_new_rejects_blank_input() {
        Question::new("   ");
    }

    #[test]
    fn test_try_new_is_the_fallible_form() {
        assert!(Question::try_new("").is_none());
        assert!(Question::try_new(" \t ").is_none());
        assert_eq!(
            Question::try_new(" pick one ").map(|q| q.content().to_string()),
            Some("pick one".to_string())
        );
    }
}
