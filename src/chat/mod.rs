//! Chat session management
//!
//! This module provides the `ChatSession` abstraction that manages:
//! - The append-only transcript of user, tutor and coach messages
//! - Text turns answered by the tutor
//! - Recorded turns scored and critiqued by the pronunciation coach
//! - Speech output for every assistant reply

mod config;
mod message;
mod scoring;
mod session;
mod stats;
mod suggestions;

pub use config::{FixedReplies, SessionConfig};
pub use message::{AudioClip, Message, Modality, Origin, Payload, Transcript};
pub use scoring::pronunciation_score;
pub use session::{
    ChatSession, Collaborators, RecordingStart, RecordingStop, SessionError, Turn,
};
pub use stats::{RecordingState, SessionStats, TurnPhase};
pub use suggestions::Suggestion;
