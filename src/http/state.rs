use crate::audio::RemoteMicrophone;
use crate::chat::{ChatSession, Collaborators, SessionConfig};
use crate::llm::{PronunciationFeedbackGenerator, TutorReplyGenerator};
use crate::mail::{MailSender, MailSettings};
use crate::speech::{RemoteRecognizer, SpeechQueue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;

/// A chat session plus the client-fed devices bound to it
pub struct SessionHandle {
    pub session: Arc<ChatSession>,
    pub microphone: Arc<RemoteMicrophone>,
    pub recognizer: Arc<RemoteRecognizer>,
    pub speech: Arc<SpeechQueue>,
    last_active: Mutex<Instant>,
}

impl SessionHandle {
    /// Mark the session as in use
    pub fn touch(&self) {
        if let Ok(mut last) = self.last_active.lock() {
            *last = Instant::now();
        }
    }

    /// Time since the client last used the session
    pub fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .map(|last| last.elapsed())
            .unwrap_or_default()
    }
}

/// Language-model collaborators shared by every session
pub struct ChatServices {
    pub tutor: Arc<dyn TutorReplyGenerator>,
    pub coach: Arc<dyn PronunciationFeedbackGenerator>,
    /// Copied into each new session (with a fresh id)
    pub session_template: SessionConfig,
}

impl ChatServices {
    /// Create a session wired to fresh remote devices
    pub fn open_session(&self) -> SessionHandle {
        let microphone = Arc::new(RemoteMicrophone::new("client-microphone"));
        let recognizer = Arc::new(RemoteRecognizer::new());
        let speech = Arc::new(SpeechQueue::new());

        let config = SessionConfig {
            session_id: format!("chat-{}", uuid::Uuid::new_v4()),
            ..self.session_template.clone()
        };

        let collaborators = Collaborators {
            tutor: Arc::clone(&self.tutor),
            coach: Arc::clone(&self.coach),
            recognizer: recognizer.clone(),
            synthesizer: speech.clone(),
            microphone: microphone.clone(),
        };

        SessionHandle {
            session: Arc::new(ChatSession::new(config, collaborators)),
            microphone,
            recognizer,
            speech,
            last_active: Mutex::new(Instant::now()),
        }
    }
}

/// Feedback relay settings and provider
pub struct MailRelay {
    pub settings: MailSettings,
    pub sender: Arc<dyn MailSender>,
}

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active chat sessions (session_id → handle)
    pub sessions: Arc<RwLock<HashMap<String, Arc<SessionHandle>>>>,
    pub chat: Arc<ChatServices>,
    pub mail: Arc<MailRelay>,
}

impl AppState {
    pub fn new(chat: ChatServices, mail: MailRelay) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            chat: Arc::new(chat),
            mail: Arc::new(mail),
        }
    }

    /// Look up a session and mark it active
    pub async fn session(&self, session_id: &str) -> Option<Arc<SessionHandle>> {
        let handle = self.sessions.read().await.get(session_id).cloned();
        if let Some(handle) = &handle {
            handle.touch();
        }
        handle
    }

    /// Close and drop every session idle for at least `max_idle`
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let evicted: Vec<(String, Arc<SessionHandle>)> = {
            let mut sessions = self.sessions.write().await;
            let idle: Vec<String> = sessions
                .iter()
                .filter(|(_, handle)| handle.idle_for() >= max_idle)
                .map(|(id, _)| id.clone())
                .collect();
            idle.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|handle| (id, handle)))
                .collect()
        };

        for (id, handle) in &evicted {
            info!("Evicting idle chat session {}", id);
            handle.session.close().await;
        }

        evicted.len()
    }

    /// Sweep idle sessions every `every` until the task is aborted
    pub fn spawn_idle_sweeper(&self, every: Duration, max_idle: Duration) -> JoinHandle<()> {
        let state = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let evicted = state.evict_idle(max_idle).await;
                if evicted > 0 {
                    info!("Evicted {} idle chat sessions", evicted);
                }
            }
        })
    }
}
