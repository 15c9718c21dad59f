use crate::audio::CaptureConfig;
use crate::chat::SessionConfig;
use crate::llm::GeminiConfig;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub tutor: TutorConfig,
    pub recording: RecordingConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct TutorConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub history_turns: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecordingConfig {
    pub recordings_path: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub transcript_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct ChatConfig {
    pub welcome_message: bool,
    /// Sessions unused for this long are closed and dropped
    pub session_idle_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Config {
    /// Load `path` (optional, any format the `config` crate knows) over
    /// built-in defaults, then `ENGLIBOT__SECTION__KEY` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("service.name", "englibot")?
            .set_default("service.http.bind", "127.0.0.1")?
            .set_default("service.http.port", 8787)?
            .set_default("tutor.api_base", GeminiConfig::default().api_base)?
            .set_default("tutor.model", GeminiConfig::default().model)?
            .set_default("tutor.timeout_secs", 30)?
            .set_default("tutor.history_turns", 0)?
            .set_default("recording.recordings_path", "recordings")?
            .set_default("recording.sample_rate", 16000)?
            .set_default("recording.channels", 1)?
            .set_default("recording.transcript_timeout_secs", 6)?
            .set_default("chat.welcome_message", true)?
            .set_default("chat.session_idle_secs", 1800)?
            .set_default("chat.sweep_interval_secs", 60)?
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("ENGLIBOT").separator("__"))
            .build()?;

        let mut cfg: Config = settings.try_deserialize()?;

        if cfg.tutor.api_key.is_none() {
            cfg.tutor.api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        }

        Ok(cfg)
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_base: self.tutor.api_base.clone(),
            model: self.tutor.model.clone(),
            api_key: self.tutor.api_key.clone(),
            timeout_secs: self.tutor.timeout_secs,
            history_turns: self.tutor.history_turns,
        }
    }

    /// Template for new chat sessions (each gets a fresh id)
    pub fn session_template(&self) -> SessionConfig {
        let defaults = SessionConfig::default();

        SessionConfig {
            welcome_message: if self.chat.welcome_message {
                defaults.welcome_message.clone()
            } else {
                None
            },
            transcript_timeout: Duration::from_secs(self.recording.transcript_timeout_secs),
            capture: CaptureConfig {
                sample_rate: self.recording.sample_rate,
                channels: self.recording.channels,
                ..CaptureConfig::default()
            },
            recordings_path: PathBuf::from(&self.recording.recordings_path),
            ..defaults
        }
    }
}
