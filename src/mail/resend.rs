use super::feedback::OutgoingEmail;
use reqwest::Client;
use serde_json::Value;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("mail provider returned {status}")]
    Provider { status: u16, details: Value },
}

impl MailError {
    /// Provider payload worth showing outside production
    pub fn details(&self) -> Value {
        match self {
            MailError::Network(e) => Value::String(e.to_string()),
            MailError::Provider { details, .. } => details.clone(),
        }
    }
}

/// Transactional email provider
#[async_trait::async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, api_key: &str, email: &OutgoingEmail) -> Result<(), MailError>;
}

/// Resend HTTP API client
pub struct ResendClient {
    client: Client,
    endpoint: String,
}

impl ResendClient {
    pub fn new() -> Self {
        Self::with_endpoint("https://api.resend.com/emails")
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for ResendClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MailSender for ResendClient {
    async fn send(&self, api_key: &str, email: &OutgoingEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let details = response.json::<Value>().await.unwrap_or(Value::Null);
            return Err(MailError::Provider {
                status: status.as_u16(),
                details,
            });
        }

        info!("Feedback email accepted by Resend ({})", status);
        Ok(())
    }
}
