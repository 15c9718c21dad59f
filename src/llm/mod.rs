//! Language-model collaborators
//!
//! - `TutorReplyGenerator`: answers the learner's text in English
//! - `PronunciationFeedbackGenerator`: critiques a spoken attempt
//! - `GeminiClient`: production binding for both

mod gemini;
mod prompts;

pub use gemini::{GeminiClient, GeminiConfig};
pub use prompts::{COACH_SYSTEM_PROMPT, TUTOR_SYSTEM_PROMPT};

use crate::chat::{Message, Origin};

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no API key configured for the language model")]
    MissingApiKey,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider returned an empty reply")]
    EmptyReply,
}

/// One prior exchange handed to a generator
#[derive(Debug, Clone, PartialEq)]
pub struct ContextTurn {
    pub origin: Origin,
    pub text: String,
}

/// Conversation the generator may draw on; generators that keep no
/// memory ignore it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationContext {
    pub turns: Vec<ContextTurn>,
}

impl ConversationContext {
    /// Text messages of a transcript, oldest first
    pub fn from_transcript(messages: &[Message]) -> Self {
        let turns = messages
            .iter()
            .filter_map(|m| {
                m.text().map(|text| ContextTurn {
                    origin: m.origin,
                    text: text.to_string(),
                })
            })
            .collect();

        Self { turns }
    }

    /// The last `n` turns
    pub fn recent(&self, n: usize) -> &[ContextTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }
}

#[async_trait::async_trait]
pub trait TutorReplyGenerator: Send + Sync {
    async fn generate(
        &self,
        user_text: &str,
        context: &ConversationContext,
    ) -> Result<String, ProviderError>;
}

#[async_trait::async_trait]
pub trait PronunciationFeedbackGenerator: Send + Sync {
    async fn evaluate(
        &self,
        expected_text: &str,
        spoken_text: &str,
        score: u32,
    ) -> Result<String, ProviderError>;
}
