//! Lecture segmentation and summary pipeline.
//!
//! Segmentation: reset the workspace, then for every source recording
//! decode its audio, detect speech intervals, plan boundaries and cut them
//! into segment files listed in a shared `FILE;SEG` manifest.
//!
//! Summarization: read a classified-segment table, allocate segments per
//! class budget, lay them out on a timeline and concatenate them into one
//! video with a `FILE;SEG;CLASS;DURATION;TIMELINE` manifest.

pub mod config;
pub mod cutter;
pub mod duration;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod summary;
pub mod workspace;

pub use config::PipelineConfig;
pub use cutter::MediaCutter;
pub use duration::{fill_durations, EnrichReport};
pub use error::{PipelineError, PipelineResult};
pub use ingest::{RecordingReport, Segmenter};
pub use logging::{init_tracing, RecordingLogger};
pub use manifest::ManifestWriter;
pub use pipeline::{Pipeline, SummaryOutcome, SummaryRequest};
pub use summary::{allocate, build_timeline, AllocationPolicy, SummaryAssembler};
pub use workspace::Workspace;
