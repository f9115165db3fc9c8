//! Media tool seam used by the pipeline.
//!
//! Orchestration code talks to [`MediaBackend`] rather than to FFmpeg
//! directly, so it can run against a fake in tests.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use lsum_models::SegmentBoundary;

use crate::command::FfmpegRunner;
use crate::concat::concat_files;
use crate::error::MediaResult;
use crate::probe::{probe_media, MediaInfo};
use crate::trim::extract_segment;
use crate::waveform::{extract_audio, load_waveform, Waveform};

/// External media operations needed to segment and summarize recordings.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Inspect duration and audio layout.
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo>;

    /// Decode mono audio at `sample_rate` to `audio_out` and load it.
    async fn extract_waveform(
        &self,
        source: &Path,
        audio_out: &Path,
        sample_rate: u32,
    ) -> MediaResult<Waveform>;

    /// Losslessly cut `boundary` of `source` into `output`.
    async fn trim(&self, source: &Path, output: &Path, boundary: SegmentBoundary) -> MediaResult<()>;

    /// Losslessly join `inputs` in order into `output`.
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> MediaResult<()>;
}

/// [`MediaBackend`] backed by the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend {
    timeout_secs: Option<u64>,
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill any single tool invocation that runs longer than this.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    fn runner(&self) -> FfmpegRunner {
        match self.timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        }
    }
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        probe_media(path, self.timeout_secs).await
    }

    async fn extract_waveform(
        &self,
        source: &Path,
        audio_out: &Path,
        sample_rate: u32,
    ) -> MediaResult<Waveform> {
        if let Some(parent) = audio_out.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        extract_audio(source, audio_out, sample_rate, &self.runner()).await?;
        load_waveform(audio_out, sample_rate).await
    }

    async fn trim(&self, source: &Path, output: &Path, boundary: SegmentBoundary) -> MediaResult<()> {
        extract_segment(source, output, boundary, &self.runner()).await
    }

    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> MediaResult<()> {
        concat_files(inputs, output, &self.runner()).await
    }
}
