use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since recording started
    pub timestamp_ms: u64,
}

/// Configuration for a microphone capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Sample rate of the recorded clip (frames are resampled to it)
    pub sample_rate: u32,
    /// Channel count of the recorded clip (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Frame queue depth between the device and the clip writer
    pub buffer_frames: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // 16kHz is plenty for speech
            channels: 1,        // Mono
            buffer_frames: 256,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The user (or the platform) refused microphone access
    #[error("microphone permission denied: {0}")]
    PermissionDenied(String),

    #[error("microphone is already capturing")]
    AlreadyCapturing,

    #[error("microphone is not capturing")]
    NotCapturing,

    #[error("audio device error: {0}")]
    Device(String),
}

/// Microphone capture trait
///
/// Implementations:
/// - `RemoteMicrophone`: frames are pushed by a client that owns the real device
/// - test doubles
#[async_trait::async_trait]
pub trait Microphone: Send + Sync {
    /// Request access and start capturing
    ///
    /// Returns a channel receiver that will receive audio frames until `stop`
    async fn start(&self, config: &CaptureConfig) -> Result<mpsc::Receiver<AudioFrame>, CaptureError>;

    /// Stop capturing and release the device
    async fn stop(&self) -> Result<(), CaptureError>;

    /// Check if the microphone is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get microphone name for logging
    fn name(&self) -> &str;
}
