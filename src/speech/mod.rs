//! Speech capabilities
//!
//! Speech-to-text and text-to-speech both run on the client; this module
//! defines the traits the chat session talks to and the bindings that
//! relay them over HTTP.

pub mod recognizer;
pub mod synthesizer;
pub mod voice;

pub use recognizer::{
    RecognitionError, RecognitionEvent, RecognitionStream, RemoteRecognizer, SpeechRecognizer,
};
pub use synthesizer::{SpeechQueue, SpeechSynthesizer, Utterance};
pub use voice::{pick_voice, InstalledVoice, VoiceProfile};
