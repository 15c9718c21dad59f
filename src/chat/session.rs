use super::config::SessionConfig;
use super::message::{AudioClip, Message, Origin, Payload, Transcript};
use super::scoring::pronunciation_score;
use super::stats::{RecordingState, SessionStats, TurnPhase};
use super::suggestions::Suggestion;
use crate::audio::{CaptureError, ClipMetadata, ClipRecorder, Microphone};
use crate::llm::{ConversationContext, PronunciationFeedbackGenerator, TutorReplyGenerator};
use crate::speech::{RecognitionEvent, RecognitionStream, SpeechRecognizer, SpeechSynthesizer};
use chrono::Utc;
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Everything a session talks to
#[derive(Clone)]
pub struct Collaborators {
    pub tutor: Arc<dyn TutorReplyGenerator>,
    pub coach: Arc<dyn PronunciationFeedbackGenerator>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub microphone: Arc<dyn Microphone>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("message is empty")]
    EmptyInput,

    #[error("another turn is in progress ({0:?})")]
    Busy(TurnPhase),

    #[error("session is closed")]
    Closed,
}

/// One accepted text turn
#[derive(Debug, Clone)]
pub struct Turn {
    pub prompt: Message,
    pub reply: Message,
}

#[derive(Debug, Clone)]
pub enum RecordingStart {
    Started,
    AlreadyRecording,
    /// The microphone could not be opened; the coach explained why
    Refused(Message),
}

/// Result of stopping a recording
#[derive(Debug, Clone, Default)]
pub struct RecordingStop {
    /// Messages appended, in order (empty when nothing was recording)
    pub messages: Vec<Message>,
    /// Pronunciation score, when a transcript was available
    pub score: Option<u32>,
}

struct ActiveRecording {
    started: Instant,
    clip_task: JoinHandle<anyhow::Result<ClipMetadata>>,
    listener_task: Option<JoinHandle<Option<String>>>,
}

struct SessionState {
    transcript: Transcript,
    draft: String,
    phase: TurnPhase,
    recording: Option<ActiveRecording>,
    closed: bool,
}

/// A tutoring chat: transcript plus a one-turn-at-a-time protocol with the
/// tutor and the pronunciation coach
pub struct ChatSession {
    config: SessionConfig,
    collaborators: Collaborators,
    started_at: chrono::DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl ChatSession {
    pub fn new(config: SessionConfig, collaborators: Collaborators) -> Self {
        info!("Creating chat session: {}", config.session_id);

        let mut transcript = Transcript::new();
        if let Some(welcome) = &config.welcome_message {
            transcript.append_text(Origin::Tutor, welcome.clone());
        }

        Self {
            config,
            collaborators,
            started_at: Utc::now(),
            state: Mutex::new(SessionState {
                transcript,
                draft: String::new(),
                phase: TurnPhase::Idle,
                recording: None,
                closed: false,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.config.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Send a text message to the tutor
    ///
    /// Blank text and text sent while another turn is open are refused
    /// without touching the transcript. Otherwise exactly two messages are
    /// appended: the user's text and the tutor's reply (or an apology).
    pub async fn submit_text(&self, text: &str) -> Result<Turn, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let (prompt, context) = {
            let mut state = self.state.lock().await;
            if state.phase != TurnPhase::Idle {
                warn!(
                    "Session {} refused text while {:?}",
                    self.config.session_id, state.phase
                );
                return Err(SessionError::Busy(state.phase));
            }

            let context = ConversationContext::from_transcript(state.transcript.messages());
            let prompt = state.transcript.append_text(Origin::User, text);
            state.draft.clear();
            state.phase = TurnPhase::AwaitingTutorReply;
            (prompt, context)
        };

        info!("Session {}: asking tutor", self.config.session_id);

        let reply_text = match self.collaborators.tutor.generate(text, &context).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Tutor reply failed: {}", e);
                self.config.replies.tutor_unavailable.clone()
            }
        };

        let reply = {
            let mut state = self.state.lock().await;
            let reply = state.transcript.append_text(Origin::Tutor, reply_text.clone());
            state.phase = TurnPhase::Idle;
            reply
        };

        self.collaborators
            .synthesizer
            .speak(&reply_text, &self.config.tutor_voice);

        Ok(Turn { prompt, reply })
    }

    /// Send whatever is in the draft
    pub async fn submit_draft(&self) -> Result<Turn, SessionError> {
        let draft = self.state.lock().await.draft.clone();
        self.submit_text(&draft).await
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.state.lock().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.state.lock().await.draft.clone()
    }

    /// Replace the draft with a suggestion's prompt
    pub async fn apply_suggestion(&self, suggestion: Suggestion) -> String {
        let prompt = suggestion.prompt().to_string();
        self.set_draft(prompt.clone()).await;
        prompt
    }

    /// Open the microphone and start listening
    ///
    /// The session lock is released while the devices open, so a pending
    /// permission prompt does not block readers of the transcript.
    pub async fn start_recording(&self) -> Result<RecordingStart, SessionError> {
        {
            let mut state = self.state.lock().await;
            match state.phase {
                TurnPhase::Recording => return Ok(RecordingStart::AlreadyRecording),
                TurnPhase::Idle => {}
                other => return Err(SessionError::Busy(other)),
            }
            state.phase = TurnPhase::StartingRecording;
        }

        let microphone = &self.collaborators.microphone;
        let frames = match microphone.start(&self.config.capture).await {
            Ok(frames) => frames,
            Err(e) => {
                warn!("Could not open {}: {}", microphone.name(), e);
                let text = match e {
                    CaptureError::PermissionDenied(_) => &self.config.replies.microphone_denied,
                    _ => &self.config.replies.recording_failed,
                };
                return Ok(self.refuse_recording(text.clone()).await);
            }
        };

        let clip_path = self.config.recordings_path.join(format!(
            "{}-{}.wav",
            self.config.session_id,
            uuid::Uuid::new_v4()
        ));
        let recorder = match ClipRecorder::new(self.config.capture.clone(), clip_path) {
            Ok(recorder) => recorder,
            Err(e) => {
                error!("Failed to prepare clip: {:#}", e);
                release(microphone.as_ref()).await;
                let text = self.config.replies.recording_failed.clone();
                return Ok(self.refuse_recording(text).await);
            }
        };
        let clip_task = tokio::spawn(recorder.record(frames));

        let listener_task = match self
            .collaborators
            .recognizer
            .start(&self.config.recognition_language)
            .await
        {
            Ok(events) => Some(tokio::spawn(collect_transcript(events))),
            Err(e) => {
                warn!("Speech listener unavailable: {}", e);
                None
            }
        };

        let mut state = self.state.lock().await;
        if state.closed {
            state.phase = TurnPhase::Idle;
            drop(state);
            info!("Session {} closed while the microphone opened", self.config.session_id);
            release(microphone.as_ref()).await;
            self.collaborators.recognizer.stop().await;
            if let Some(task) = listener_task {
                task.abort();
            }
            return Err(SessionError::Closed);
        }

        state.phase = TurnPhase::Recording;
        state.recording = Some(ActiveRecording {
            started: Instant::now(),
            clip_task,
            listener_task,
        });

        info!("Session {}: recording", self.config.session_id);

        Ok(RecordingStart::Started)
    }

    async fn refuse_recording(&self, text: String) -> RecordingStart {
        let mut state = self.state.lock().await;
        let message = state.transcript.append_text(Origin::Coach, text);
        state.phase = TurnPhase::Idle;
        RecordingStart::Refused(message)
    }

    /// Close the microphone, file the clip and, when speech was
    /// recognized, run the pronunciation turn
    pub async fn stop_recording(&self) -> Result<RecordingStop, SessionError> {
        let recording = {
            let mut state = self.state.lock().await;
            if state.phase != TurnPhase::Recording {
                return Ok(RecordingStop::default());
            }
            state.phase = TurnPhase::AwaitingTranscript;
            state.recording.take()
        };

        let Some(recording) = recording else {
            self.state.lock().await.phase = TurnPhase::Idle;
            return Ok(RecordingStop::default());
        };

        let elapsed = recording.started.elapsed();
        release(self.collaborators.microphone.as_ref()).await;
        self.collaborators.recognizer.stop().await;

        let clip = match recording.clip_task.await {
            Ok(Ok(metadata)) => Some(metadata),
            Ok(Err(e)) => {
                error!("Failed to finalize clip: {:#}", e);
                None
            }
            Err(e) => {
                error!("Clip task panicked: {}", e);
                None
            }
        };

        let mut outcome = RecordingStop::default();
        {
            let mut state = self.state.lock().await;
            let message = match &clip {
                Some(metadata) => {
                    let measured = metadata.duration_secs();
                    let duration_secs = if metadata.sample_count > 0 {
                        measured
                    } else {
                        elapsed.as_secs_f64()
                    };
                    state.transcript.append(
                        Origin::User,
                        Payload::Audio {
                            clip: AudioClip {
                                reference: metadata.file_path.display().to_string(),
                                duration_secs,
                            },
                        },
                    )
                }
                None => state
                    .transcript
                    .append_text(Origin::Coach, self.config.replies.recording_failed.clone()),
            };
            outcome.messages.push(message);
        }

        if clip.is_none() {
            if let Some(task) = recording.listener_task {
                task.abort();
            }
            self.state.lock().await.phase = TurnPhase::Idle;
            return Ok(outcome);
        }

        let spoken = match recording.listener_task {
            Some(task) => self.await_transcript(task).await,
            None => None,
        };

        let Some(spoken) = spoken.filter(|t| !t.trim().is_empty()) else {
            info!("Session {}: no transcript", self.config.session_id);
            let mut state = self.state.lock().await;
            let message = state.transcript.append_text(
                Origin::Coach,
                self.config.replies.transcription_unavailable.clone(),
            );
            state.phase = TurnPhase::Idle;
            outcome.messages.push(message);
            return Ok(outcome);
        };

        let expected = {
            let mut state = self.state.lock().await;
            state.phase = TurnPhase::AwaitingCoachReply;
            state
                .transcript
                .last_tutor_text()
                .map(str::to_string)
                .unwrap_or_else(|| self.config.default_reference_phrase.clone())
        };

        let score = pronunciation_score(&expected, &spoken);
        info!(
            "Session {}: pronunciation score {} (\"{}\" vs \"{}\")",
            self.config.session_id, score, expected, spoken
        );

        let feedback = match self
            .collaborators
            .coach
            .evaluate(&expected, &spoken, score)
            .await
        {
            Ok(feedback) => feedback,
            Err(e) => {
                error!("Pronunciation feedback failed: {}", e);
                self.config.replies.coach_unavailable.clone()
            }
        };

        {
            let mut state = self.state.lock().await;
            let message = state.transcript.append_text(Origin::Coach, feedback.clone());
            state.phase = TurnPhase::Idle;
            outcome.messages.push(message);
        }

        self.collaborators
            .synthesizer
            .speak(&feedback, &self.config.coach_voice);

        outcome.score = Some(score);
        Ok(outcome)
    }

    /// Wait for the listener's last transcript, bounded by the timeout
    async fn await_transcript(&self, mut task: JoinHandle<Option<String>>) -> Option<String> {
        match tokio::time::timeout(self.config.transcript_timeout, &mut task).await {
            Ok(Ok(transcript)) => transcript,
            Ok(Err(e)) => {
                error!("Speech listener task panicked: {}", e);
                None
            }
            Err(_) => {
                warn!(
                    "No transcript after {:?}, giving up",
                    self.config.transcript_timeout
                );
                task.abort();
                None
            }
        }
    }

    /// Release any open recording; used when the session is discarded
    pub async fn close(&self) {
        let recording = {
            let mut state = self.state.lock().await;
            state.closed = true;
            if state.phase == TurnPhase::Recording {
                state.phase = TurnPhase::Idle;
            }
            state.recording.take()
        };
        if let Some(recording) = recording {
            release(self.collaborators.microphone.as_ref()).await;
            self.collaborators.recognizer.stop().await;
            if let Some(task) = recording.listener_task {
                task.abort();
            }
            // The clip task ends on its own once the frame stream closes
            drop(recording.clip_task);
        }
        info!("Chat session {} closed", self.config.session_id);
    }

    /// Get the transcript so far
    pub async fn transcript(&self) -> Vec<Message> {
        self.state.lock().await.transcript.messages().to_vec()
    }

    pub async fn phase(&self) -> TurnPhase {
        self.state.lock().await.phase
    }

    pub async fn recording_state(&self) -> RecordingState {
        let state = self.state.lock().await;
        recording_state(&state)
    }

    /// Get current session statistics
    pub async fn stats(&self) -> SessionStats {
        let state = self.state.lock().await;

        SessionStats {
            session_id: self.config.session_id.clone(),
            started_at: self.started_at,
            phase: state.phase,
            recording: recording_state(&state),
            message_count: state.transcript.len(),
            draft: state.draft.clone(),
        }
    }
}

fn recording_state(state: &SessionState) -> RecordingState {
    match &state.recording {
        Some(recording) => RecordingState::Recording {
            elapsed_secs: recording.started.elapsed().as_secs_f64(),
        },
        None => RecordingState::Idle,
    }
}

async fn release(microphone: &dyn Microphone) {
    if let Err(e) = microphone.stop().await {
        error!("Failed to release {}: {}", microphone.name(), e);
    }
}

/// Follow a listener until it settles on a transcript or stops
///
/// A final result wins; otherwise the last interim hypothesis is kept.
/// A recognition error yields nothing.
async fn collect_transcript(mut events: RecognitionStream) -> Option<String> {
    let mut latest = None;

    while let Some(event) = events.next().await {
        match event {
            RecognitionEvent::Final { text } => return Some(text),
            RecognitionEvent::Partial { text } => latest = Some(text),
            RecognitionEvent::Error { message } => {
                warn!("Speech recognition error: {}", message);
                return None;
            }
            RecognitionEvent::End => break,
        }
    }

    latest
}
