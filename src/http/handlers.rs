use super::state::{AppState, SessionHandle};
use crate::audio::AudioFrame;
use crate::chat::{Message, RecordingStart, SessionError, SessionStats, Suggestion};
use crate::speech::{InstalledVoice, RecognitionEvent, Utterance};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitMessageRequest {
    /// Text to send; the session draft is sent when absent
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct StartRecordingRequest {
    /// Outcome of the client's microphone permission prompt
    pub permission_granted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct AudioFrameRequest {
    /// Base64-encoded little-endian i16 PCM
    pub pcm: String,
    pub sample_rate: u32,
    pub channels: u16,
    #[serde(default)]
    pub timestamp_ms: u64,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub transcript: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct MessagesResponse {
    pub messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
pub struct RecordingStartResponse {
    pub status: String,
    pub message: Option<Message>,
}

#[derive(Debug, Serialize)]
pub struct RecordingStopResponse {
    pub messages: Vec<Message>,
    pub score: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub kind: Suggestion,
    pub label: String,
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct DraftResponse {
    pub draft: String,
}

#[derive(Debug, Serialize)]
pub struct SpeechResponse {
    pub utterances: Vec<Utterance>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

fn not_found(session_id: &str) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Session {} not found", session_id),
    )
}

fn session_error(e: SessionError) -> Response {
    let status = match e {
        SessionError::EmptyInput => StatusCode::BAD_REQUEST,
        SessionError::Busy(_) => StatusCode::CONFLICT,
        SessionError::Closed => StatusCode::GONE,
    };
    error_response(status, e.to_string())
}

fn task_failed(e: tokio::task::JoinError) -> Response {
    error!("Session task failed: {}", e);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Session task failed")
}

async fn lookup(state: &AppState, session_id: &str) -> Result<Arc<SessionHandle>, Response> {
    state
        .session(session_id)
        .await
        .ok_or_else(|| not_found(session_id))
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /chat/suggestions
pub async fn list_suggestions() -> impl IntoResponse {
    let suggestions: Vec<SuggestionResponse> = Suggestion::ALL
        .iter()
        .map(|s| SuggestionResponse {
            kind: *s,
            label: s.label().to_string(),
            prompt: s.prompt().to_string(),
        })
        .collect();

    Json(suggestions)
}

/// POST /chat/sessions
/// Start a new chat session
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let handle = Arc::new(state.chat.open_session());
    let session_id = handle.session.id().to_string();
    let transcript = handle.session.transcript().await;

    state
        .sessions
        .write()
        .await
        .insert(session_id.clone(), handle);

    info!("Chat session created: {}", session_id);

    (
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id,
            transcript,
        }),
    )
}

/// DELETE /chat/sessions/:session_id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let handle = state.sessions.write().await.remove(&session_id);

    match handle {
        Some(handle) => {
            handle.session.close().await;
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(&session_id),
    }
}

/// GET /chat/sessions/:session_id/transcript
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(handle) => Json(handle.session.transcript().await).into_response(),
        Err(response) => response,
    }
}

/// GET /chat/sessions/:session_id/status
pub async fn get_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(handle) => {
            let stats: SessionStats = handle.session.stats().await;
            Json(stats).into_response()
        }
        Err(response) => response,
    }
}

/// PUT /chat/sessions/:session_id/draft
pub async fn set_draft(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<DraftRequest>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(handle) => {
            handle.session.set_draft(req.text).await;
            Json(DraftResponse {
                draft: handle.session.draft().await,
            })
            .into_response()
        }
        Err(response) => response,
    }
}

/// POST /chat/sessions/:session_id/suggestions/:kind
pub async fn apply_suggestion(
    State(state): State<AppState>,
    Path((session_id, kind)): Path<(String, String)>,
) -> Response {
    let Some(suggestion) = Suggestion::parse(&kind) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Unknown suggestion {}", kind),
        );
    };

    match lookup(&state, &session_id).await {
        Ok(handle) => {
            let draft = handle.session.apply_suggestion(suggestion).await;
            Json(DraftResponse { draft }).into_response()
        }
        Err(response) => response,
    }
}

/// POST /chat/sessions/:session_id/messages
/// Send text to the tutor and wait for the reply
pub async fn submit_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Option<Json<SubmitMessageRequest>>,
) -> Response {
    let handle = match lookup(&state, &session_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let text = body.and_then(|Json(req)| req.text);
    let session = Arc::clone(&handle.session);

    // Run the turn on its own task so a dropped connection cannot
    // abandon it half way
    let result = tokio::spawn(async move {
        match text {
            Some(text) => session.submit_text(&text).await,
            None => session.submit_draft().await,
        }
    })
    .await;

    match result {
        Ok(Ok(turn)) => Json(MessagesResponse {
            messages: vec![turn.prompt, turn.reply],
        })
        .into_response(),
        Ok(Err(e)) => session_error(e),
        Err(e) => task_failed(e),
    }
}

/// POST /chat/sessions/:session_id/recording/start
pub async fn start_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    body: Option<Json<StartRecordingRequest>>,
) -> Response {
    let handle = match lookup(&state, &session_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let granted = body
        .and_then(|Json(req)| req.permission_granted)
        .unwrap_or(true);
    handle.microphone.set_permission(granted);

    let (status, message) = match handle.session.start_recording().await {
        Ok(RecordingStart::Started) => ("recording", None),
        Ok(RecordingStart::AlreadyRecording) => ("already_recording", None),
        Ok(RecordingStart::Refused(message)) => ("refused", Some(message)),
        Err(e) => return session_error(e),
    };

    Json(RecordingStartResponse {
        status: status.to_string(),
        message,
    })
    .into_response()
}

/// POST /chat/sessions/:session_id/recording/stop
/// Stop recording and run the pronunciation turn
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    let handle = match lookup(&state, &session_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let session = Arc::clone(&handle.session);
    let result = tokio::spawn(async move { session.stop_recording().await }).await;

    match result {
        Ok(Ok(stop)) => Json(RecordingStopResponse {
            messages: stop.messages,
            score: stop.score,
        })
        .into_response(),
        Ok(Err(e)) => session_error(e),
        Err(e) => task_failed(e),
    }
}

/// POST /chat/sessions/:session_id/audio
/// Push a PCM frame captured on the client
pub async fn push_audio(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<AudioFrameRequest>,
) -> Response {
    let handle = match lookup(&state, &session_id).await {
        Ok(handle) => handle,
        Err(response) => return response,
    };

    let bytes = match base64::engine::general_purpose::STANDARD.decode(&req.pcm) {
        Ok(bytes) => bytes,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid PCM payload: {}", e))
        }
    };

    if bytes.len() % 2 != 0 {
        return error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid PCM payload: {} bytes is not whole 16-bit samples", bytes.len()),
        );
    }

    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let frame = AudioFrame {
        samples,
        sample_rate: req.sample_rate,
        channels: req.channels,
        timestamp_ms: req.timestamp_ms,
    };

    match handle.microphone.push_frame(frame).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, e.to_string()),
    }
}

/// POST /chat/sessions/:session_id/recognition
/// Push a speech recognition event produced on the client
pub async fn push_recognition(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(event): Json<RecognitionEvent>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(handle) => match handle.recognizer.push(event) {
            Ok(()) => StatusCode::ACCEPTED.into_response(),
            Err(e) => error_response(StatusCode::CONFLICT, e.to_string()),
        },
        Err(response) => response,
    }
}

/// PUT /chat/sessions/:session_id/voices
pub async fn set_voices(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(voices): Json<Vec<InstalledVoice>>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(handle) => {
            handle.speech.set_installed_voices(voices);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(response) => response,
    }
}

/// GET /chat/sessions/:session_id/speech
/// Take the utterances queued since the last call
pub async fn drain_speech(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match lookup(&state, &session_id).await {
        Ok(handle) => Json(SpeechResponse {
            utterances: handle.speech.drain(),
        })
        .into_response(),
        Err(response) => response,
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
