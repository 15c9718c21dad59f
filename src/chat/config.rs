use crate::audio::CaptureConfig;
use crate::speech::VoiceProfile;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for a chat session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Unique session identifier
    pub session_id: String,

    /// First tutor message of the transcript (None = start empty)
    pub welcome_message: Option<String>,

    /// Reference phrase for pronunciation when the tutor has not spoken yet
    pub default_reference_phrase: String,

    /// Language the speech listener expects
    pub recognition_language: String,

    /// How long to wait for the listener's last transcript after stopping
    pub transcript_timeout: Duration,

    pub tutor_voice: VoiceProfile,
    pub coach_voice: VoiceProfile,

    /// Format of recorded clips
    pub capture: CaptureConfig,

    /// Directory recorded clips are written to
    pub recordings_path: PathBuf,

    pub replies: FixedReplies,
}

/// User-visible strings for the failure paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedReplies {
    pub tutor_unavailable: String,
    pub coach_unavailable: String,
    pub microphone_denied: String,
    pub transcription_unavailable: String,
    pub recording_failed: String,
}

impl Default for FixedReplies {
    fn default() -> Self {
        Self {
            tutor_unavailable: "Sorry, something went wrong. Please try again.".to_string(),
            coach_unavailable: "Hubo un problema generando la respuesta por voz.".to_string(),
            microphone_denied: "❌ No pude acceder al micrófono. Revisa permisos.".to_string(),
            transcription_unavailable:
                "No pude transcribir tu audio, así que no hay puntuación esta vez. Inténtalo de nuevo."
                    .to_string(),
            recording_failed: "❌ No pude guardar la grabación. Inténtalo de nuevo.".to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_id: format!("chat-{}", uuid::Uuid::new_v4()),
            welcome_message: Some(
                "Hi! I'm your A2 English tutor. How can I help today? Vocabulary, grammar, or conversation? 😊"
                    .to_string(),
            ),
            default_reference_phrase: "Hello, how are you today?".to_string(),
            recognition_language: "en-US".to_string(),
            transcript_timeout: Duration::from_secs(6),
            tutor_voice: VoiceProfile::tutor(),
            coach_voice: VoiceProfile::coach(),
            capture: CaptureConfig::default(),
            recordings_path: PathBuf::from("recordings"),
            replies: FixedReplies::default(),
        }
    }
}
