use serde::{Deserialize, Serialize};

/// Canned prompts offered next to the input box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suggestion {
    Vocabulary,
    Grammar,
    Pronunciation,
    Question,
}

impl Suggestion {
    pub const ALL: [Suggestion; 4] = [
        Suggestion::Vocabulary,
        Suggestion::Grammar,
        Suggestion::Pronunciation,
        Suggestion::Question,
    ];

    /// Button caption
    pub fn label(&self) -> &'static str {
        match self {
            Suggestion::Vocabulary => "Practicar vocabulario",
            Suggestion::Grammar => "Revisar gramática",
            Suggestion::Pronunciation => "Practicar pronunciación",
            Suggestion::Question => "Hacer una pregunta",
        }
    }

    /// Text placed in the draft
    pub fn prompt(&self) -> &'static str {
        match self {
            Suggestion::Vocabulary => "Let's practice A2 vocabulary about daily routines.",
            Suggestion::Grammar => "Can you help me with present simple vs. present continuous?",
            Suggestion::Pronunciation => "I want to practice pronunciation with short sentences.",
            Suggestion::Question => "I have a question about English prepositions.",
        }
    }

    pub fn parse(kind: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.key() == kind.to_ascii_lowercase())
    }

    pub fn key(&self) -> &'static str {
        match self {
            Suggestion::Vocabulary => "vocabulary",
            Suggestion::Grammar => "grammar",
            Suggestion::Pronunciation => "pronunciation",
            Suggestion::Question => "question",
        }
    }
}
