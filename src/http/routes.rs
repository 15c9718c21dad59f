use super::state::AppState;
use super::{feedback, handlers};
use axum::{
    routing::{any, delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Feedback relay
        .route("/api/send-feedback", any(feedback::send_feedback))
        .route("/api/debug-env", get(feedback::debug_env))
        // Chat sessions
        .route("/chat/suggestions", get(handlers::list_suggestions))
        .route("/chat/sessions", post(handlers::create_session))
        .route("/chat/sessions/:session_id", delete(handlers::delete_session))
        .route(
            "/chat/sessions/:session_id/transcript",
            get(handlers::get_transcript),
        )
        .route("/chat/sessions/:session_id/status", get(handlers::get_status))
        .route("/chat/sessions/:session_id/draft", put(handlers::set_draft))
        .route(
            "/chat/sessions/:session_id/suggestions/:kind",
            post(handlers::apply_suggestion),
        )
        // Turns
        .route(
            "/chat/sessions/:session_id/messages",
            post(handlers::submit_message),
        )
        .route(
            "/chat/sessions/:session_id/recording/start",
            post(handlers::start_recording),
        )
        .route(
            "/chat/sessions/:session_id/recording/stop",
            post(handlers::stop_recording),
        )
        // Client-side devices
        .route("/chat/sessions/:session_id/audio", post(handlers::push_audio))
        .route(
            "/chat/sessions/:session_id/recognition",
            post(handlers::push_recognition),
        )
        .route("/chat/sessions/:session_id/voices", put(handlers::set_voices))
        .route("/chat/sessions/:session_id/speech", get(handlers::drain_speech))
        // The front end is served from another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
