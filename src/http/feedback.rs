use super::state::AppState;
use crate::mail::FeedbackForm;
use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{error, info, warn};

fn json_error(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

/// ANY /api/send-feedback
/// Relay the testimonial form to the configured inbox
pub async fn send_feedback(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return json_error(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    }

    let Some(form) = FeedbackForm::parse(&body) else {
        warn!("Feedback rejected: missing fields");
        return json_error(StatusCode::BAD_REQUEST, "Missing fields");
    };

    let settings = &state.mail.settings;
    let Some(api_key) = settings.api_key.as_deref() else {
        error!("RESEND_API_KEY not set");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "RESEND_API_KEY not set");
    };
    let Some(to) = settings.to.as_deref() else {
        error!("FEEDBACK_TO_EMAIL not set");
        return json_error(StatusCode::INTERNAL_SERVER_ERROR, "FEEDBACK_TO_EMAIL not set");
    };

    let email = form.to_email(settings.from_address(), to);

    match state.mail.sender.send(api_key, &email).await {
        Ok(()) => {
            info!("Feedback from {} relayed", form.name);
            (StatusCode::OK, Json(json!({ "ok": true }))).into_response()
        }
        Err(e) => {
            error!("Resend error: {}", e);
            if settings.is_production() {
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email")
            } else {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": e.to_string(), "details": e.details() })),
                )
                    .into_response()
            }
        }
    }
}

/// GET /api/debug-env
pub async fn debug_env(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.mail.settings.diagnostics())
}
