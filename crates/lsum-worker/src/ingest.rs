//! Recording ingestion: waveform, silence detection, planning, cutting.
//!
//! [`Segmenter::segment_all`] runs every pending recording on a bounded
//! pool. Recordings are independent; one failing does not stop the others.

use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, Instrument};

use lsum_media::{MediaBackend, SegmentPlanner, SilenceIntervalSource};
use lsum_models::{Recording, RecordingId, Segment, SegmentBoundary, SilenceInterval};

use crate::cutter::MediaCutter;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::RecordingLogger;
use crate::manifest::ManifestWriter;
use crate::workspace::Workspace;

/// Outcome of segmenting one recording.
#[derive(Debug)]
pub struct RecordingReport {
    pub source: PathBuf,
    pub outcome: PipelineResult<Vec<Segment>>,
}

impl RecordingReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Plans and cuts recordings into segments.
pub struct Segmenter {
    backend: Arc<dyn MediaBackend>,
    detector: Arc<dyn SilenceIntervalSource>,
    planner: SegmentPlanner,
    workspace: Workspace,
    sample_rate: u32,
    max_parallel: usize,
}

impl Segmenter {
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        detector: Arc<dyn SilenceIntervalSource>,
        planner: SegmentPlanner,
        workspace: Workspace,
        sample_rate: u32,
    ) -> Self {
        Self {
            backend,
            detector,
            planner,
            workspace,
            sample_rate,
            max_parallel: 1,
        }
    }

    /// Maximum recordings processed at the same time.
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Probe, decode and plan one recording without cutting it.
    pub async fn plan_recording(
        &self,
        source: &Path,
    ) -> PipelineResult<(Recording, Vec<SegmentBoundary>)> {
        let id = RecordingId::from_path(source).ok_or_else(|| {
            PipelineError::config_error(format!("No recording name in {}", source.display()))
        })?;
        let media_failed = |source| PipelineError::Recording {
            recording: id.clone(),
            source,
        };

        let info = self.backend.probe(source).await.map_err(media_failed)?;
        let waveform = self
            .backend
            .extract_waveform(source, &self.workspace.audio_path(&id), self.sample_rate)
            .await
            .map_err(media_failed)?;

        let intervals = clamp_to_duration(self.detector.detect(&waveform), info.duration);
        if waveform.duration() > info.duration {
            debug!(
                recording = %id,
                decoded = waveform.duration(),
                probed = info.duration,
                "Decoded audio runs past the container duration"
            );
        }
        let boundaries = self
            .planner
            .plan(info.duration, &intervals)
            .map_err(|source| PipelineError::Planning {
                recording: id.clone(),
                source,
            })?;

        let recording = Recording {
            id,
            path: source.to_path_buf(),
            duration: info.duration,
            sample_rate: info.sample_rate.unwrap_or(self.sample_rate),
            channels: info.channels.unwrap_or(1),
        };
        Ok((recording, boundaries))
    }

    /// Segment every source, appending to the workspace manifest.
    ///
    /// Reports come back in input order.
    pub async fn segment_all(&self, sources: &[PathBuf]) -> PipelineResult<Vec<RecordingReport>> {
        let manifest = Arc::new(ManifestWriter::open(self.workspace.manifest_path()).await?);
        let cutter = MediaCutter::new(
            Arc::clone(&self.backend),
            self.workspace.segments_dir(),
            manifest,
        );
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));

        info!(
            recordings = sources.len(),
            max_parallel = self.max_parallel,
            "Segmenting recordings"
        );

        let futures = sources.iter().map(|source| {
            let semaphore = Arc::clone(&semaphore);
            let cutter = cutter.clone();
            let id = RecordingId::from_path(source)
                .unwrap_or_else(|| RecordingId::from(source.to_string_lossy().into_owned()));
            let logger = RecordingLogger::new(&id, "segment");
            let span = logger.create_span();

            async move {
                let _permit = semaphore.acquire().await.ok();
                logger.log_start(&source.display().to_string());

                let outcome = async {
                    let (recording, boundaries) = self.plan_recording(source).await?;
                    logger.log_progress(&format!(
                        "planned {} segments over {:.2}s",
                        boundaries.len(),
                        recording.duration
                    ));
                    if boundaries.len() == 1 {
                        logger.log_warning("no usable pauses, keeping the recording whole");
                    }
                    cutter.cut(&recording, &boundaries).await
                }
                .await;
                match &outcome {
                    Ok(segments) => {
                        logger.log_completion(&format!("{} segments", segments.len()))
                    }
                    Err(e) => logger.log_error(&e.to_string()),
                }

                RecordingReport {
                    source: source.clone(),
                    outcome,
                }
            }
            .instrument(span)
        });

        Ok(join_all(futures).await)
    }
}

/// Decoded audio can run a few samples past the container duration.
fn clamp_to_duration(intervals: Vec<SilenceInterval>, total: f64) -> Vec<SilenceInterval> {
    intervals
        .into_iter()
        .map(|i| SilenceInterval::new(i.start, i.end.min(total)))
        .filter(|i| i.start < i.end)
        .collect()
}
