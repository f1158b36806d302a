use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use unicode_segmentation::UnicodeSegmentation;

/// Reason why the generation finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    ToolCalls,
    Error,
    /// A reason the backend reported that this crate does not model
    Other,
}

/// One generated continuation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSample {
    pub text: String,
    pub token_ids: Vec<u32>,
    pub total_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
}

impl GenerationSample {
    /// Build a sample from raw text, deriving the lexical token stream
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let token_ids = lexical_token_ids(&text);
        let total_tokens = token_ids.len() as u32;

        Self {
            text,
            token_ids,
            total_tokens,
            model: None,
            finish_reason: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }

    /// Override the token count reported by the backend
    pub fn with_total_tokens(mut self, total_tokens: u32) -> Self {
        self.total_tokens = total_tokens;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.token_ids.is_empty()
    }
}

/// Deterministic lexical token ids for a text
///
/// Words come from Unicode word segmentation, are case-folded, and map to the
/// leading 32 bits of their SHA-256 digest, so equal words share an id across
/// samples and runs.
pub fn lexical_token_ids(text: &str) -> Vec<u32> {
    text.unicode_words()
        .map(|word| word_id(&word.to_lowercase()))
        .collect()
}

fn word_id(word: &str) -> u32 {
    let digest = Sha256::digest(word.as_bytes());
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_case_insensitive_and_stable() {
        let a = lexical_token_ids("En un lugar de la Mancha");
        let b = lexical_token_ids("en UN lugar de LA mancha");
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_punctuation_is_not_a_token() {
        let ids = lexical_token_ids("Call me Ishmael.");
        assert_eq!(ids.len(), 3);
        assert_eq!(ids, lexical_token_ids("call me ishmael"));
    }

    #[test]
    fn test_repeated_words_share_an_id() {
        let ids = lexical_token_ids("it was the best of times, it was");
        assert_eq!(ids[0], ids[6]);
        assert_eq!(ids[1], ids[7]);
    }

    #[test]
    fn test_empty_sample() {
        let sample = GenerationSample::from_text("");
        assert!(sample.is_empty());
        assert_eq!(sample.total_tokens, 0);
    }

    #[test]
    fn test_sample_builders() {
        let sample = GenerationSample::from_text("hello world")
            .with_model("mock-model")
            .with_finish_reason(FinishReason::Length)
            .with_total_tokens(12);

        assert_eq!(sample.token_ids.len(), 2);
        assert_eq!(sample.total_tokens, 12);
        assert_eq!(sample.model.as_deref(), Some("mock-model"));
        assert_eq!(sample.finish_reason, Some(FinishReason::Length));
    }
}
