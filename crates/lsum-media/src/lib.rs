//! FFmpeg CLI wrapper and segmentation for lecture recordings.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeouts
//! - FFprobe duration and audio layout inspection
//! - Mono waveform extraction and energy-based silence detection
//! - The silence-aligned segment planner
//! - Stream-copy trimming and concatenation
//! - The [`MediaBackend`] seam used by the pipeline

pub mod backend;
pub mod command;
pub mod concat;
pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod segmentation;
pub mod silence;
pub mod trim;
pub mod waveform;

pub use backend::{FfmpegBackend, MediaBackend};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use concat::concat_files;
pub use error::{MediaError, MediaResult};
pub use probe::{probe_media, MediaInfo};
pub use segmentation::{plan_segments, PlannerConfig, PlanningError, SegmentPlanner};
pub use silence::{EnergySilenceConfig, EnergySilenceDetector, SilenceIntervalSource};
pub use trim::extract_segment;
pub use waveform::{Waveform, DEFAULT_SAMPLE_RATE};
