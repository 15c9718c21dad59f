use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    User,
    /// Answers learning questions in English
    Tutor,
    /// Scores and critiques pronunciation
    Coach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
}

/// Reference to a recorded clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioClip {
    /// Where the clip was stored
    pub reference: String,
    pub duration_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "modality", rename_all = "lowercase")]
pub enum Payload {
    Text { content: String },
    Audio { clip: AudioClip },
}

/// A transcript entry; never changes after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub origin: Origin,
    #[serde(flatten)]
    pub payload: Payload,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text { content } => Some(content),
            Payload::Audio { .. } => None,
        }
    }

    pub fn modality(&self) -> Modality {
        match self.payload {
            Payload::Text { .. } => Modality::Text,
            Payload::Audio { .. } => Modality::Audio,
        }
    }
}

/// Append-only, ordered log of a session's messages
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new message and return a copy of it
    ///
    /// Timestamps never go backwards: a clock that stepped back is clamped
    /// to the previous message's time.
    pub fn append(&mut self, origin: Origin, payload: Payload) -> Message {
        let now = Utc::now();
        let created_at = match self.messages.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            origin,
            payload,
            created_at,
        };
        self.messages.push(message.clone());
        message
    }

    pub fn append_text(&mut self, origin: Origin, content: impl Into<String>) -> Message {
        self.append(
            origin,
            Payload::Text {
                content: content.into(),
            },
        )
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the most recent tutor text message
    pub fn last_tutor_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .filter(|m| m.origin == Origin::Tutor)
            .find_map(Message::text)
    }
}
