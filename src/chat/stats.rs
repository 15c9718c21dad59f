use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a session is in its turn protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    Idle,
    AwaitingTutorReply,
    /// Waiting on the microphone and listener to open
    StartingRecording,
    Recording,
    AwaitingTranscript,
    AwaitingCoachReply,
}

/// Microphone state as seen by the UI
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum RecordingState {
    Idle,
    Recording { elapsed_secs: f64 },
}

/// Statistics about a chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub session_id: String,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    pub phase: TurnPhase,

    pub recording: RecordingState,

    /// Number of messages in the transcript
    pub message_count: usize,

    /// Current input draft
    pub draft: String,
}
