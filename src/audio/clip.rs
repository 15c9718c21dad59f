use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::backend::{AudioFrame, CaptureConfig};

/// Metadata for a finished clip
#[derive(Debug, Clone)]
pub struct ClipMetadata {
    /// File path to the clip
    pub file_path: PathBuf,
    /// Sample rate
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Number of samples written (all channels)
    pub sample_count: usize,
}

impl ClipMetadata {
    /// Measured duration of the clip in seconds
    pub fn duration_secs(&self) -> f64 {
        let per_second = self.sample_rate as f64 * self.channels.max(1) as f64;
        if per_second == 0.0 {
            return 0.0;
        }
        self.sample_count as f64 / per_second
    }
}

/// Records one microphone capture into a single WAV clip
pub struct ClipRecorder {
    config: CaptureConfig,
    file_path: PathBuf,
}

impl ClipRecorder {
    pub fn new(config: CaptureConfig, file_path: PathBuf) -> Result<Self> {
        if let Some(dir) = file_path.parent() {
            fs::create_dir_all(dir).context("Failed to create recordings directory")?;
        }

        Ok(Self { config, file_path })
    }

    /// Consume frames until the capture closes, then finalize the clip
    ///
    /// The WAV file is created when the first frame arrives (or at the end,
    /// for an empty capture).
    pub async fn record(self, mut audio_rx: mpsc::Receiver<AudioFrame>) -> Result<ClipMetadata> {
        let mut converter = FrameConverter::new(self.config.sample_rate, self.config.channels);
        let mut writer: Option<ClipWriter> = None;

        info!("Recording clip to {:?}", self.file_path);

        while let Some(frame) = audio_rx.recv().await {
            let frame = converter.convert(frame);
            if writer.is_none() {
                writer = Some(self.open_writer()?);
            }
            if let Some(clip) = writer.as_mut() {
                clip.write_frame(&frame)?;
            }
        }

        let writer = match writer {
            Some(writer) => writer,
            None => self.open_writer()?,
        };
        let metadata = writer.finish()?;

        info!(
            "Clip complete: {:?} ({:.1}s, {} samples)",
            metadata.file_path,
            metadata.duration_secs(),
            metadata.sample_count
        );

        Ok(metadata)
    }

    fn open_writer(&self) -> Result<ClipWriter> {
        ClipWriter::new(
            self.file_path.clone(),
            self.config.sample_rate,
            self.config.channels,
        )
    }
}

/// Convert a single frame to the clip format
pub fn process_frame(frame: AudioFrame, target_sample_rate: u32, target_channels: u16) -> AudioFrame {
    FrameConverter::new(target_sample_rate, target_channels).convert(frame)
}

/// Converts a stream of frames to the clip format
///
/// Rate reduction keeps, for output sample `k`, source sample
/// `floor(k * source_rate / target_rate)`. Counts carry over between frames
/// so chunked input gives the same clip as one long frame.
#[derive(Debug)]
pub struct FrameConverter {
    sample_rate: u32,
    channels: u16,
    source_rate: u32,
    /// Output sample groups produced at the current source rate
    emitted: u64,
    /// Source sample groups seen at the current source rate
    consumed: u64,
}

impl FrameConverter {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            source_rate: 0,
            emitted: 0,
            consumed: 0,
        }
    }

    pub fn convert(&mut self, frame: AudioFrame) -> AudioFrame {
        let mut processed = frame;

        if processed.sample_rate != self.sample_rate {
            processed = self.downsample(processed);
        }

        if processed.channels != self.channels && self.channels == 1 {
            processed = stereo_to_mono(processed);
        }

        processed
    }

    fn downsample(&mut self, frame: AudioFrame) -> AudioFrame {
        let target_rate = self.sample_rate as u64;
        if target_rate == 0 || frame.sample_rate as u64 <= target_rate {
            return frame; // Can't upsample
        }

        if frame.sample_rate != self.source_rate {
            self.source_rate = frame.sample_rate;
            self.emitted = 0;
            self.consumed = 0;
        }

        let source_rate = frame.sample_rate as u64;
        let channels = frame.channels.max(1) as usize;
        let groups = (frame.samples.len() / channels) as u64;

        let mut downsampled = Vec::with_capacity(
            (groups * target_rate / source_rate) as usize * channels + channels,
        );
        loop {
            let index = self.emitted * source_rate / target_rate - self.consumed;
            if index >= groups {
                break;
            }
            // Whole interleaved groups keep channels aligned
            let start = index as usize * channels;
            downsampled.extend_from_slice(&frame.samples[start..start + channels]);
            self.emitted += 1;
        }
        self.consumed += groups;

        AudioFrame {
            samples: downsampled,
            sample_rate: self.sample_rate,
            channels: frame.channels,
            timestamp_ms: frame.timestamp_ms,
        }
    }
}

/// Convert stereo to mono by averaging channels
fn stereo_to_mono(frame: AudioFrame) -> AudioFrame {
    if frame.channels != 2 {
        return frame; // Only support stereo -> mono
    }

    let mono_samples = frame
        .samples
        .chunks_exact(2)
        .map(|pair| ((pair[0] as i32 + pair[1] as i32) / 2) as i16)
        .collect();

    AudioFrame {
        samples: mono_samples,
        sample_rate: frame.sample_rate,
        channels: 1,
        timestamp_ms: frame.timestamp_ms,
    }
}

/// Writes a clip to disk as WAV file
struct ClipWriter {
    writer: Option<hound::WavWriter<BufWriter<File>>>,
    metadata: ClipMetadata,
}

impl ClipWriter {
    fn new(file_path: PathBuf, sample_rate: u32, channels: u16) -> Result<Self> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let writer = hound::WavWriter::create(&file_path, spec)
            .with_context(|| format!("Failed to create WAV file: {:?}", file_path))?;

        Ok(Self {
            writer: Some(writer),
            metadata: ClipMetadata {
                file_path,
                sample_rate,
                channels,
                sample_count: 0,
            },
        })
    }

    fn write_frame(&mut self, frame: &AudioFrame) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            for &sample in &frame.samples {
                writer
                    .write_sample(sample)
                    .context("Failed to write sample to WAV")?;
            }

            self.metadata.sample_count += frame.samples.len();
        }

        Ok(())
    }

    fn finish(mut self) -> Result<ClipMetadata> {
        if let Some(writer) = self.writer.take() {
            writer.finalize().context("Failed to finalize WAV file")?;
        }

        Ok(self.metadata.clone())
    }
}

impl Drop for ClipWriter {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(e) = writer.finalize() {
                warn!("Failed to finalize WAV writer on drop: {}", e);
            }
        }
    }
}
