use futures::channel::mpsc;
use futures::stream::{BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Event emitted by a speech-to-text listener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecognitionEvent {
    /// Interim hypothesis, may still change
    Partial { text: String },
    /// Settled transcript
    Final { text: String },
    /// Permission or recognition failure
    Error { message: String },
    /// The listener stopped
    End,
}

#[derive(Debug, thiserror::Error)]
pub enum RecognitionError {
    #[error("speech recognition is not available")]
    Unsupported,

    #[error("speech recognition failed: {0}")]
    Failed(String),
}

pub type RecognitionStream = BoxStream<'static, RecognitionEvent>;

/// Speech-to-text listener
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Start listening for speech in `language` (BCP 47 tag, e.g. "en-US")
    async fn start(&self, language: &str) -> Result<RecognitionStream, RecognitionError>;

    /// Ask the listener to stop; it emits `End` once it has
    async fn stop(&self);
}

/// Recognizer fed by a client that runs the platform speech engine
pub struct RemoteRecognizer {
    sender: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
    language: Mutex<Option<String>>,
}

impl RemoteRecognizer {
    pub fn new() -> Self {
        Self {
            sender: Mutex::new(None),
            language: Mutex::new(None),
        }
    }

    /// Language of the active listener, if any
    pub fn language(&self) -> Option<String> {
        self.language.lock().ok().and_then(|lang| lang.clone())
    }

    /// Whether a listener is waiting for client events
    pub fn is_listening(&self) -> bool {
        self.sender
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Forward an event produced on the client
    pub fn push(&self, event: RecognitionEvent) -> Result<(), RecognitionError> {
        let mut guard = self
            .sender
            .lock()
            .map_err(|_| RecognitionError::Failed("recognizer lock poisoned".to_string()))?;

        let sender = guard
            .as_ref()
            .ok_or_else(|| RecognitionError::Failed("no active listener".to_string()))?;

        debug!("Recognition event: {:?}", event);

        let terminal = matches!(event, RecognitionEvent::End | RecognitionEvent::Error { .. });
        if sender.unbounded_send(event).is_err() {
            // The session stopped listening; forget the dead channel
            guard.take();
            return Err(RecognitionError::Failed("listener already closed".to_string()));
        }

        if terminal {
            guard.take();
        }

        Ok(())
    }
}

impl Default for RemoteRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for RemoteRecognizer {
    async fn start(&self, language: &str) -> Result<RecognitionStream, RecognitionError> {
        let (tx, rx) = mpsc::unbounded();

        {
            let mut guard = self
                .sender
                .lock()
                .map_err(|_| RecognitionError::Failed("recognizer lock poisoned".to_string()))?;
            if guard.replace(tx).is_some() {
                warn!("Replacing a speech listener that never ended");
            }
        }

        if let Ok(mut lang) = self.language.lock() {
            *lang = Some(language.to_string());
        }

        info!("Speech listener started ({})", language);

        Ok(rx.boxed())
    }

    async fn stop(&self) {
        // The client delivers its last result and `End` after it stops
        // its engine, so the channel stays open until then.
        info!("Speech listener stop requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_reach_the_listener_until_end() {
        let recognizer = RemoteRecognizer::new();
        let mut events = recognizer.start("en-US").await.unwrap();

        recognizer
            .push(RecognitionEvent::Partial { text: "Hel".into() })
            .unwrap();
        recognizer.push(RecognitionEvent::End).unwrap();

        assert!(!recognizer.is_listening());
        assert_eq!(
            events.next().await,
            Some(RecognitionEvent::Partial { text: "Hel".into() })
        );
        assert_eq!(events.next().await, Some(RecognitionEvent::End));
        assert_eq!(events.next().await, None);
    }

    #[tokio::test]
    async fn test_closed_listener_is_forgotten() {
        let recognizer = RemoteRecognizer::new();
        let events = recognizer.start("en-US").await.unwrap();
        drop(events);

        assert!(recognizer.push(RecognitionEvent::End).is_err());
        assert!(!recognizer.is_listening());

        // Next push reports no listener instead of a stale channel
        let err = recognizer
            .push(RecognitionEvent::Final { text: "hi".into() })
            .unwrap_err();
        assert!(err.to_string().contains("no active listener"));
    }
}
