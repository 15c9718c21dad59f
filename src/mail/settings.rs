use serde::Serialize;

pub const DEFAULT_FROM: &str = "EngliBot <onboarding@resend.dev>";

/// Mail relay settings, read from the process environment
#[derive(Debug, Clone, Default)]
pub struct MailSettings {
    /// `RESEND_API_KEY`
    pub api_key: Option<String>,
    /// `FEEDBACK_TO_EMAIL`
    pub to: Option<String>,
    /// `FEEDBACK_FROM_EMAIL`
    pub from: Option<String>,
    /// `DEPLOY_ENV`; anything but "production" exposes provider errors
    pub environment: Option<String>,
}

/// What `/api/debug-env` reports
#[derive(Debug, Clone, Serialize)]
pub struct MailDiagnostics {
    pub environment: Option<String>,
    pub has_resend_api_key: bool,
    pub has_feedback_to_email: bool,
    pub from: String,
}

impl MailSettings {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        Self {
            api_key: var("RESEND_API_KEY"),
            to: var("FEEDBACK_TO_EMAIL"),
            from: var("FEEDBACK_FROM_EMAIL"),
            environment: var("DEPLOY_ENV"),
        }
    }

    pub fn from_address(&self) -> &str {
        self.from.as_deref().unwrap_or(DEFAULT_FROM)
    }

    pub fn is_production(&self) -> bool {
        self.environment.as_deref() == Some("production")
    }

    pub fn diagnostics(&self) -> MailDiagnostics {
        MailDiagnostics {
            environment: self.environment.clone(),
            has_resend_api_key: self.api_key.is_some(),
            has_feedback_to_email: self.to.is_some(),
            from: self.from_address().to_string(),
        }
    }
}
