// Test doubles for the chat session's collaborators
#![allow(dead_code)]

use englibot::audio::{AudioFrame, CaptureConfig, CaptureError, Microphone};
use englibot::chat::{ChatSession, Collaborators, SessionConfig};
use englibot::llm::{
    ConversationContext, PronunciationFeedbackGenerator, ProviderError, TutorReplyGenerator,
};
use englibot::mail::{MailError, MailSender, OutgoingEmail};
use englibot::speech::{
    RecognitionError, RecognitionEvent, RecognitionStream, SpeechRecognizer, SpeechSynthesizer,
    VoiceProfile,
};
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

// ============================================================================
// Tutor
// ============================================================================

/// Replies from a script; an empty script answers "Great question!"
#[derive(Default)]
pub struct ScriptedTutor {
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    pub calls: Mutex<Vec<(String, ConversationContext)>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replying(replies: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Hold every reply until `gate` is notified
    pub fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl TutorReplyGenerator for ScriptedTutor {
    async fn generate(
        &self,
        user_text: &str,
        context: &ConversationContext,
    ) -> Result<String, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((user_text.to_string(), context.clone()));

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("Great question!".to_string()))
    }
}

pub fn provider_down() -> ProviderError {
    ProviderError::Status {
        status: 503,
        body: "overloaded".to_string(),
    }
}

// ============================================================================
// Coach
// ============================================================================

pub struct FakeCoach {
    fail: bool,
    pub calls: Mutex<Vec<(String, String, u32)>>,
}

impl FakeCoach {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl PronunciationFeedbackGenerator for FakeCoach {
    async fn evaluate(
        &self,
        expected_text: &str,
        spoken_text: &str,
        score: u32,
    ) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push((
            expected_text.to_string(),
            spoken_text.to_string(),
            score,
        ));

        if self.fail {
            return Err(ProviderError::MissingApiKey);
        }
        Ok(format!("¡Buen trabajo! Puntuación {}.", score))
    }
}

// ============================================================================
// Speech
// ============================================================================

pub enum Listening {
    /// Emit these events, then close
    Events(Vec<RecognitionEvent>),
    /// Never produce anything
    Silent,
    /// Recognition is not available
    Unsupported,
}

pub struct FakeRecognizer {
    behavior: Listening,
    pub languages: Mutex<Vec<String>>,
    pub stops: AtomicUsize,
}

impl FakeRecognizer {
    pub fn new(behavior: Listening) -> Self {
        Self {
            behavior,
            languages: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn hearing(text: &str) -> Self {
        Self::new(Listening::Events(vec![
            RecognitionEvent::Final {
                text: text.to_string(),
            },
            RecognitionEvent::End,
        ]))
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for FakeRecognizer {
    async fn start(&self, language: &str) -> Result<RecognitionStream, RecognitionError> {
        self.languages.lock().unwrap().push(language.to_string());
        match &self.behavior {
            Listening::Events(events) => Ok(stream::iter(events.clone()).boxed()),
            Listening::Silent => Ok(stream::pending().boxed()),
            Listening::Unsupported => Err(RecognitionError::Unsupported),
        }
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingSynth {
    pub spoken: Mutex<Vec<(String, VoiceProfile)>>,
}

impl RecordingSynth {
    pub fn languages(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap()
            .iter()
            .map(|(_, voice)| voice.language.clone())
            .collect()
    }
}

impl SpeechSynthesizer for RecordingSynth {
    fn speak(&self, text: &str, voice: &VoiceProfile) {
        self.spoken
            .lock()
            .unwrap()
            .push((text.to_string(), voice.clone()));
    }
}

// ============================================================================
// Microphone
// ============================================================================

/// Microphone that replays prepared frames as soon as it opens
pub struct FakeMicrophone {
    granted: bool,
    frames: Vec<AudioFrame>,
    sender: Mutex<Option<mpsc::Sender<AudioFrame>>>,
    capturing: AtomicBool,
    gate: Option<Arc<Notify>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

impl FakeMicrophone {
    pub fn new(frames: Vec<AudioFrame>) -> Self {
        Self {
            granted: true,
            frames,
            sender: Mutex::new(None),
            capturing: AtomicBool::new(false),
            gate: None,
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    pub fn denied() -> Self {
        Self {
            granted: false,
            ..Self::new(Vec::new())
        }
    }

    /// Opens only once `gate` is notified, like a pending permission prompt
    pub fn gated(frames: Vec<AudioFrame>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(frames)
        }
    }
}

#[async_trait::async_trait]
impl Microphone for FakeMicrophone {
    async fn start(&self, config: &CaptureConfig) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if !self.granted {
            return Err(CaptureError::PermissionDenied("NotAllowedError".to_string()));
        }

        let (tx, rx) = mpsc::channel(config.buffer_frames.max(self.frames.len() + 1));
        for frame in &self.frames {
            tx.try_send(frame.clone()).expect("frame buffer too small");
        }
        *self.sender.lock().unwrap() = Some(tx);
        self.capturing.store(true, Ordering::SeqCst);
        Ok(rx)
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.sender.lock().unwrap().take();
        self.capturing.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "fake-microphone"
    }
}

/// `samples` of silence at 16kHz mono
pub fn mono_frame(samples: usize) -> AudioFrame {
    AudioFrame {
        samples: vec![0; samples],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: 0,
    }
}

// ============================================================================
// Mail
// ============================================================================

#[derive(Default)]
pub struct FakeMailer {
    pub fail: bool,
    pub sent: Mutex<Vec<(String, OutgoingEmail)>>,
}

#[async_trait::async_trait]
impl MailSender for FakeMailer {
    async fn send(&self, api_key: &str, email: &OutgoingEmail) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Provider {
                status: 422,
                details: serde_json::json!({ "message": "Invalid `to` field" }),
            });
        }
        self.sent
            .lock()
            .unwrap()
            .push((api_key.to_string(), email.clone()));
        Ok(())
    }
}

// ============================================================================
// Session harness
// ============================================================================

pub struct Harness {
    pub session: Arc<ChatSession>,
    pub tutor: Arc<ScriptedTutor>,
    pub coach: Arc<FakeCoach>,
    pub recognizer: Arc<FakeRecognizer>,
    pub synth: Arc<RecordingSynth>,
    pub microphone: Arc<FakeMicrophone>,
    pub recordings: tempfile::TempDir,
}

pub struct HarnessBuilder {
    pub tutor: ScriptedTutor,
    pub coach: FakeCoach,
    pub recognizer: FakeRecognizer,
    pub microphone: FakeMicrophone,
    pub welcome: bool,
    pub transcript_timeout: Duration,
    /// Defaults to the harness tempdir
    pub recordings_path: Option<std::path::PathBuf>,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            tutor: ScriptedTutor::new(),
            coach: FakeCoach::new(),
            recognizer: FakeRecognizer::new(Listening::Events(vec![RecognitionEvent::End])),
            microphone: FakeMicrophone::new(vec![mono_frame(1600)]),
            welcome: true,
            transcript_timeout: Duration::from_secs(2),
            recordings_path: None,
        }
    }
}

impl HarnessBuilder {
    pub fn build(self) -> Harness {
        let recordings = tempfile::tempdir().unwrap();

        let defaults = SessionConfig::default();
        let config = SessionConfig {
            session_id: "test-session".to_string(),
            welcome_message: if self.welcome {
                defaults.welcome_message.clone()
            } else {
                None
            },
            transcript_timeout: self.transcript_timeout,
            recordings_path: self
                .recordings_path
                .unwrap_or_else(|| recordings.path().to_path_buf()),
            ..defaults
        };

        let tutor = Arc::new(self.tutor);
        let coach = Arc::new(self.coach);
        let recognizer = Arc::new(self.recognizer);
        let synth = Arc::new(RecordingSynth::default());
        let microphone = Arc::new(self.microphone);

        let collaborators = Collaborators {
            tutor: tutor.clone(),
            coach: coach.clone(),
            recognizer: recognizer.clone(),
            synthesizer: synth.clone(),
            microphone: microphone.clone(),
        };

        Harness {
            session: Arc::new(ChatSession::new(config, collaborators)),
            tutor,
            coach,
            recognizer,
            synth,
            microphone,
            recordings,
        }
    }
}

pub fn harness() -> Harness {
    HarnessBuilder::default().build()
}

// ============================================================================
// HTTP app
// ============================================================================

pub struct TestApp {
    pub router: axum::Router,
    pub state: englibot::http::AppState,
    pub mailer: Arc<FakeMailer>,
    pub recordings: tempfile::TempDir,
}

pub fn test_app(settings: englibot::mail::MailSettings, mailer: FakeMailer) -> TestApp {
    use englibot::http::{create_router, AppState, ChatServices, MailRelay};

    let recordings = tempfile::tempdir().unwrap();
    let mailer = Arc::new(mailer);

    let chat = ChatServices {
        tutor: Arc::new(ScriptedTutor::new()),
        coach: Arc::new(FakeCoach::new()),
        session_template: SessionConfig {
            recordings_path: recordings.path().to_path_buf(),
            transcript_timeout: Duration::from_secs(2),
            ..SessionConfig::default()
        },
    };
    let mail = MailRelay {
        settings,
        sender: mailer.clone(),
    };

    let state = AppState::new(chat, mail);
    TestApp {
        router: create_router(state.clone()),
        state,
        mailer,
        recordings,
    }
}

pub fn configured_mail() -> englibot::mail::MailSettings {
    englibot::mail::MailSettings {
        api_key: Some("re_test".to_string()),
        to: Some("inbox@example.com".to_string()),
        from: None,
        environment: Some("production".to_string()),
    }
}

/// Send a request and decode the JSON reply (Null for empty bodies)
pub async fn call(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
