//! Fake media backend for worker integration tests.
//!
//! Every "media file" is a text file holding its duration in seconds.
//! Trimming writes the boundary length, concatenation writes the sum of
//! its inputs, and probing reads the number back.

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use lsum_media::{MediaBackend, MediaError, MediaInfo, MediaResult, Waveform};
use lsum_models::SegmentBoundary;

/// Sample rate used by the fake decoder.
pub const RATE: u32 = 1_000;

#[derive(Default)]
pub struct FakeBackend {
    /// Segment file name (e.g. `part_2.mp4`) whose trim fails
    pub fail_trim: Option<String>,
    /// Make concatenation write a partial file and then fail
    pub fail_concat: bool,
    /// Delay inside waveform extraction, to observe concurrency
    pub decode_delay: Duration,
    /// Extra decoded samples past the probed duration, with speech to the end
    pub overrun_samples: usize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    trims: Mutex<Vec<PathBuf>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_trim(segment_file: &str) -> Self {
        Self {
            fail_trim: Some(segment_file.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_concat() -> Self {
        Self {
            fail_concat: true,
            ..Self::default()
        }
    }

    pub fn with_decode_delay(mut self, delay: Duration) -> Self {
        self.decode_delay = delay;
        self
    }

    pub fn with_overrun(mut self, samples: usize) -> Self {
        self.overrun_samples = samples;
        self
    }

    /// Highest number of simultaneous waveform extractions seen.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn trimmed(&self) -> Vec<PathBuf> {
        self.trims.lock().unwrap().clone()
    }
}

async fn read_duration(path: &Path) -> MediaResult<f64> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }
    let text = tokio::fs::read_to_string(path).await?;
    text.trim()
        .parse::<f64>()
        .map_err(|_| MediaError::invalid_media(format!("not a fake media file: {}", path.display())))
}

/// Speech with a half-second pause every five seconds.
pub fn lecture_samples(duration: f64, sample_rate: u32) -> Vec<f32> {
    let total = (duration * sample_rate as f64).round() as usize;
    let period = 5 * sample_rate as usize;
    let speech = period * 9 / 10;
    (0..total)
        .map(|i| if i % period < speech { 0.5 } else { 0.0 })
        .collect()
}

#[async_trait]
impl MediaBackend for FakeBackend {
    async fn probe(&self, path: &Path) -> MediaResult<MediaInfo> {
        let duration = read_duration(path).await?;
        Ok(MediaInfo {
            duration,
            sample_rate: Some(48_000),
            channels: Some(2),
            has_video: true,
            size: tokio::fs::metadata(path).await?.len(),
        })
    }

    async fn extract_waveform(
        &self,
        source: &Path,
        audio_out: &Path,
        sample_rate: u32,
    ) -> MediaResult<Waveform> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.decode_delay).await;

        let result: MediaResult<Waveform> = async {
            let duration = read_duration(source).await?;
            if let Some(parent) = audio_out.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(audio_out, b"pcm").await?;
            let mut samples = lecture_samples(duration, sample_rate);
            if self.overrun_samples > 0 {
                for sample in samples.iter_mut().rev().take_while(|s| **s == 0.0) {
                    *sample = 0.5;
                }
                samples.extend(std::iter::repeat(0.5).take(self.overrun_samples));
            }
            Ok(Waveform::new(samples, sample_rate))
        }
        .await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn trim(&self, source: &Path, output: &Path, boundary: SegmentBoundary) -> MediaResult<()> {
        read_duration(source).await?;
        self.trims.lock().unwrap().push(output.to_path_buf());

        let name = output.file_name().map(|n| n.to_string_lossy().into_owned());
        if name.is_some() && name == self.fail_trim {
            return Err(MediaError::ffmpeg_failed("trim rejected", None, Some(1)));
        }

        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output, format!("{}", boundary.duration())).await?;
        Ok(())
    }

    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> MediaResult<()> {
        if self.fail_concat {
            tokio::fs::write(output, b"partial").await?;
            return Err(MediaError::ffmpeg_failed("concat rejected", None, Some(1)));
        }

        let mut total = 0.0;
        for input in inputs {
            total += read_duration(input).await?;
        }
        tokio::fs::write(output, format!("{}", total)).await?;
        Ok(())
    }
}

/// Write a fake media file of `duration` seconds.
pub fn write_media(path: &Path, duration: f64) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, format!("{}", duration)).unwrap();
}

/// Names of all files directly inside `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
