pub mod audio;
pub mod chat;
pub mod config;
pub mod http;
pub mod llm;
pub mod mail;
pub mod speech;

pub use audio::{AudioFrame, CaptureConfig, CaptureError, ClipMetadata, ClipRecorder, Microphone, RemoteMicrophone};
pub use chat::{
    pronunciation_score, ChatSession, Collaborators, Message, Origin, Payload, RecordingStart,
    RecordingStop, SessionConfig, SessionError, SessionStats, Transcript, TurnPhase,
};
pub use config::Config;
pub use http::{create_router, AppState, ChatServices, MailRelay};
pub use llm::{GeminiClient, GeminiConfig, PronunciationFeedbackGenerator, ProviderError, TutorReplyGenerator};
pub use mail::{FeedbackForm, MailSender, MailSettings, ResendClient};
pub use speech::{RecognitionEvent, RemoteRecognizer, SpeechQueue, SpeechRecognizer, SpeechSynthesizer, VoiceProfile};
