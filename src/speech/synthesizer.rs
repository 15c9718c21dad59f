use super::voice::{pick_voice, InstalledVoice, VoiceProfile};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::{info, warn};

/// Text-to-speech output; fire-and-forget
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str, voice: &VoiceProfile);
}

/// A pending utterance, as handed to the client for playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
    /// Installed voice to use, when the client reported its voices
    pub voice_name: Option<String>,
}

/// FIFO of utterances the client drains and plays in order
///
/// Queueing keeps a coach critique from talking over a tutor reply.
#[derive(Default)]
pub struct SpeechQueue {
    pending: Mutex<VecDeque<Utterance>>,
    voices: Mutex<Vec<InstalledVoice>>,
}

impl SpeechQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list of voices installed on the client
    pub fn set_installed_voices(&self, voices: Vec<InstalledVoice>) {
        info!("Client reported {} synthesis voices", voices.len());
        if let Ok(mut guard) = self.voices.lock() {
            *guard = voices;
        }
    }

    /// Take every queued utterance, oldest first
    pub fn drain(&self) -> Vec<Utterance> {
        match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SpeechSynthesizer for SpeechQueue {
    fn speak(&self, text: &str, voice: &VoiceProfile) {
        let voice_name = self
            .voices
            .lock()
            .ok()
            .and_then(|voices| pick_voice(&voices, voice).map(|v| v.name.clone()));

        let utterance = Utterance {
            text: text.to_string(),
            language: voice.language.clone(),
            rate: voice.rate,
            pitch: voice.pitch,
            voice_name,
        };

        match self.pending.lock() {
            Ok(mut pending) => pending.push_back(utterance),
            Err(_) => warn!("Speech queue poisoned, dropping utterance"),
        }
    }
}
