pub mod backend;
pub mod clip;
pub mod remote;

pub use backend::{AudioFrame, CaptureConfig, CaptureError, Microphone};
pub use clip::{ClipMetadata, ClipRecorder, FrameConverter};
pub use remote::RemoteMicrophone;
