use super::backend::{AudioFrame, CaptureConfig, CaptureError, Microphone};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Microphone whose device lives on the client
///
/// The client reports whether it obtained microphone access and then
/// pushes PCM frames while the capture is open.
pub struct RemoteMicrophone {
    name: String,
    permission_granted: AtomicBool,
    sender: Mutex<Option<mpsc::Sender<AudioFrame>>>,
}

impl RemoteMicrophone {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permission_granted: AtomicBool::new(true),
            sender: Mutex::new(None),
        }
    }

    /// Record the outcome of the client's permission prompt
    pub fn set_permission(&self, granted: bool) {
        self.permission_granted.store(granted, Ordering::SeqCst);
    }

    /// Forward a frame captured on the client
    pub async fn push_frame(&self, frame: AudioFrame) -> Result<(), CaptureError> {
        let sender = {
            let guard = self.sender.lock().map_err(|_| poisoned())?;
            guard.clone().ok_or(CaptureError::NotCapturing)?
        };

        debug!(
            "Pushing {} samples to {} (t={}ms)",
            frame.samples.len(),
            self.name,
            frame.timestamp_ms
        );

        sender
            .send(frame)
            .await
            .map_err(|_| CaptureError::NotCapturing)
    }
}

#[async_trait::async_trait]
impl Microphone for RemoteMicrophone {
    async fn start(&self, config: &CaptureConfig) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        if !self.permission_granted.load(Ordering::SeqCst) {
            warn!("Microphone access denied for {}", self.name);
            return Err(CaptureError::PermissionDenied(
                "client reported that microphone access was refused".to_string(),
            ));
        }

        let mut guard = self.sender.lock().map_err(|_| poisoned())?;
        if guard.is_some() {
            return Err(CaptureError::AlreadyCapturing);
        }

        let (tx, rx) = mpsc::channel(config.buffer_frames.max(1));
        *guard = Some(tx);

        info!(
            "Microphone {} opened ({} Hz, {} ch)",
            self.name, config.sample_rate, config.channels
        );

        Ok(rx)
    }

    async fn stop(&self) -> Result<(), CaptureError> {
        let mut guard = self.sender.lock().map_err(|_| poisoned())?;
        // Dropping the sender ends the frame stream
        if guard.take().is_some() {
            info!("Microphone {} released", self.name);
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.sender
            .lock()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn poisoned() -> CaptureError {
    CaptureError::Device("microphone state lock poisoned".to_string())
}
