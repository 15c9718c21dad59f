use anyhow::{Context, Result};
use clap::Parser;
use englibot::{
    create_router, AppState, ChatServices, Config, GeminiClient, MailRelay, MailSettings,
    ResendClient,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "englibot", about = "EngliBot A2 tutoring service")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(long, default_value = "config/englibot")]
    config: String,

    /// Override the bind address
    #[arg(long)]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("EngliBot v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);

    if cfg.tutor.api_key.is_none() {
        warn!("No Gemini API key configured; tutor replies will fall back to apologies");
    }

    let gemini = Arc::new(GeminiClient::new(cfg.gemini()).context("Failed to build Gemini client")?);
    let chat = ChatServices {
        tutor: gemini.clone(),
        coach: gemini,
        session_template: cfg.session_template(),
    };

    let mail = MailRelay {
        settings: MailSettings::from_env(),
        sender: Arc::new(ResendClient::new()),
    };

    let state = AppState::new(chat, mail);
    let _sweeper = state.spawn_idle_sweeper(
        Duration::from_secs(cfg.chat.sweep_interval_secs),
        Duration::from_secs(cfg.chat.session_idle_secs),
    );
    let app = create_router(state);

    let bind = args.bind.unwrap_or(cfg.service.http.bind);
    let port = args.port.unwrap_or(cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind((bind.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind, port))?;

    info!("HTTP server listening on {}:{}", bind, port);

    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}
