use super::prompts::{coach_prompt, COACH_SYSTEM_PROMPT, TUTOR_SYSTEM_PROMPT};
use super::{
    ContextTurn, ConversationContext, PronunciationFeedbackGenerator, ProviderError,
    TutorReplyGenerator,
};
use crate::chat::Origin;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Gemini `generateContent` client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Prior text turns sent along with each tutor request (0 = none)
    pub history_turns: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            timeout_secs: 30,
            history_turns: 0,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(str::to_string),
            parts: vec![Part { text: text.into() }],
        }
    }
}

/// Gemini-backed tutor and pronunciation coach
pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!("Gemini client ready (model={})", config.model);

        Ok(Self { config, client })
    }

    async fn generate_content(&self, request: &GenerateRequest) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Gemini request failed ({}): {}", status, body);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        reply_text(parsed)
    }
}

fn reply_text(response: GenerateResponse) -> Result<String, ProviderError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    let text = text.trim();
    if text.is_empty() {
        return Err(ProviderError::EmptyReply);
    }
    Ok(text.to_string())
}

fn tutor_request(user_text: &str, history: &[ContextTurn]) -> GenerateRequest {
    // Conversations must open with a user turn
    let history = history
        .iter()
        .skip_while(|turn| turn.origin != Origin::User);

    let mut contents: Vec<Content> = history
        .map(|turn| {
            let role = match turn.origin {
                Origin::User => "user",
                Origin::Tutor | Origin::Coach => "model",
            };
            Content::text(Some(role), turn.text.clone())
        })
        .collect();
    contents.push(Content::text(Some("user"), user_text));

    GenerateRequest {
        system_instruction: Content::text(None, TUTOR_SYSTEM_PROMPT),
        contents,
    }
}

fn coach_request(expected: &str, spoken: &str, score: u32) -> GenerateRequest {
    GenerateRequest {
        system_instruction: Content::text(None, COACH_SYSTEM_PROMPT),
        contents: vec![Content::text(Some("user"), coach_prompt(expected, spoken, score))],
    }
}

#[async_trait::async_trait]
impl TutorReplyGenerator for GeminiClient {
    async fn generate(
        &self,
        user_text: &str,
        context: &ConversationContext,
    ) -> Result<String, ProviderError> {
        let request = tutor_request(user_text, context.recent(self.config.history_turns));
        self.generate_content(&request).await
    }
}

#[async_trait::async_trait]
impl PronunciationFeedbackGenerator for GeminiClient {
    async fn evaluate(
        &self,
        expected_text: &str,
        spoken_text: &str,
        score: u32,
    ) -> Result<String, ProviderError> {
        let request = coach_request(expected_text, spoken_text, score);
        self.generate_content(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tutor_request_skips_leading_model_turns() {
        let history = vec![
            ContextTurn { origin: Origin::Tutor, text: "Welcome!".into() },
            ContextTurn { origin: Origin::User, text: "Hi".into() },
            ContextTurn { origin: Origin::Tutor, text: "Hello there".into() },
        ];

        let json = serde_json::to_value(tutor_request("How are you?", &history)).unwrap();
        let contents = json["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "How are you?");
        assert!(json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("A2 learner"));
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_coach_request_carries_score() {
        let json = serde_json::to_value(coach_request("How are you", "How is you", 67)).unwrap();
        let prompt = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("67/100"));
        assert!(prompt.contains("How is you"));
    }

    #[test]
    fn test_reply_text_joins_parts_and_rejects_blank() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":" Good "},{"text":"job! "}]}}]}"#,
        )
        .unwrap();
        assert_eq!(reply_text(response).unwrap(), "Good job!");

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(matches!(reply_text(empty), Err(ProviderError::EmptyReply)));
    }
}
