//! Mono waveform extraction.
//!
//! Audio is decoded by FFmpeg to mono raw 32-bit float little-endian PCM
//! at a fixed sample rate, then loaded into memory for silence detection.

use std::path::Path;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Default analysis sample rate.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Mono PCM samples at a known rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Decode the audio track of `input` into `output` as mono f32le PCM.
pub async fn extract_audio(
    input: &Path,
    output: &Path,
    sample_rate: u32,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    debug!(
        input = %input.display(),
        output = %output.display(),
        sample_rate,
        "Extracting mono audio"
    );

    let cmd = FfmpegCommand::new(input, output)
        .no_video()
        .audio_channels(1)
        .audio_sample_rate(sample_rate)
        .output_format("f32le");

    runner.run(&cmd).await
}

/// Load f32le samples written by [`extract_audio`].
pub async fn load_waveform(path: &Path, sample_rate: u32) -> MediaResult<Waveform> {
    let bytes = tokio::fs::read(path).await?;
    let samples = decode_f32le(&bytes);

    if samples.is_empty() {
        return Err(MediaError::NoAudioData(path.to_path_buf()));
    }

    debug!(
        path = %path.display(),
        samples = samples.len(),
        "Loaded waveform"
    );

    Ok(Waveform::new(samples, sample_rate))
}

/// 4 bytes per sample; a trailing partial sample is ignored.
fn decode_f32le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
