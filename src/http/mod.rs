//! HTTP API server for the tutoring front end
//!
//! This module provides a REST API over chat sessions and the feedback relay:
//! - POST /chat/sessions - Start a chat session
//! - POST /chat/sessions/:id/messages - Send text to the tutor
//! - POST /chat/sessions/:id/recording/{start,stop} - Pronunciation turns
//! - POST /chat/sessions/:id/{audio,recognition} - Client device feeds
//! - GET /chat/sessions/:id/speech - Utterances to play
//! - ANY /api/send-feedback - Testimonial form relay
//! - GET /health - Health check

mod feedback;
mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::{AppState, ChatServices, MailRelay, SessionHandle};
