//! Entry points for each stage of the pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use lsum_media::fs_utils::remove_if_exists;
use lsum_media::{EnergySilenceDetector, MediaBackend, SegmentPlanner};
use lsum_models::{
    ClassBudgetSpec, Recording, SegmentBoundary, SummaryManifestRow, SummarySelection,
    TimelineEntry,
};

use crate::config::PipelineConfig;
use crate::duration::{fill_durations, EnrichReport};
use crate::error::{PipelineError, PipelineResult};
use crate::ingest::{RecordingReport, Segmenter};
use crate::manifest::{read_classified, read_table, write_table};
use crate::summary::{allocate, build_timeline, SummaryAssembler};
use crate::workspace::Workspace;

/// Inputs of one summary run.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    /// Classified-segment table
    pub table: PathBuf,
    pub budget: ClassBudgetSpec,
    /// Assembled video
    pub output: PathBuf,
    /// Where to write the `FILE;SEG;CLASS;DURATION;TIMELINE` manifest
    pub manifest: PathBuf,
}

/// Result of a successful summary run.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub selection: SummarySelection,
    pub timeline: Vec<TimelineEntry>,
    /// Measured duration of the assembled output
    pub duration: f64,
}

/// Configuration plus the media backend shared by every stage.
#[derive(Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    backend: Arc<dyn MediaBackend>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, backend: Arc<dyn MediaBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::from_config(&self.config)
    }

    fn segmenter(&self) -> Segmenter {
        Segmenter::new(
            Arc::clone(&self.backend),
            Arc::new(EnergySilenceDetector::new(self.config.detector.clone())),
            SegmentPlanner::new(self.config.planner.clone()),
            self.workspace(),
            self.config.sample_rate,
        )
        .with_max_parallel(self.config.max_parallel_recordings)
    }

    /// Reset the workspace, then segment every source recording.
    pub async fn run_segmentation(&self) -> PipelineResult<Vec<RecordingReport>> {
        let workspace = self.workspace();
        workspace.reset().await?;

        let inputs = workspace.discover_inputs().await?;
        if inputs.is_empty() {
            warn!(
                media_dir = %workspace.media_dir().display(),
                "No source recordings found"
            );
            return Ok(Vec::new());
        }

        let reports = self.segmenter().segment_all(&inputs).await?;
        let failed = reports.iter().filter(|r| !r.is_success()).count();
        info!(
            recordings = reports.len(),
            failed,
            manifest = %workspace.manifest_path().display(),
            "Segmentation finished"
        );
        Ok(reports)
    }

    /// Plan one recording without cutting it or touching the manifest.
    pub async fn plan(&self, source: &Path) -> PipelineResult<(Recording, Vec<SegmentBoundary>)> {
        self.segmenter().plan_recording(source).await
    }

    /// Fill missing durations of the table at `table`, writing the result to `output`.
    pub async fn run_enrich(&self, table: &Path, output: &Path) -> PipelineResult<EnrichReport> {
        let mut rows = read_table(table).await?;
        let report = fill_durations(&mut rows, &self.config.segments_dir, self.backend.as_ref())
            .await
            .map_err(|e| PipelineError::manifest(table, e))?;
        write_table(output, &rows).await?;
        Ok(report)
    }

    /// Allocate, order and assemble a summary, then write its manifest.
    ///
    /// A previous manifest is removed before assembly and the new one is
    /// written only after the video is in place.
    pub async fn run_summary(&self, request: &SummaryRequest) -> PipelineResult<SummaryOutcome> {
        request.budget.validate().map_err(|e| PipelineError::Budget(e.into()))?;

        let segments = read_classified(&request.table, &self.config.class_column).await?;
        info!(
            table = %request.table.display(),
            segments = segments.len(),
            "Loaded classified segments"
        );

        let selection = allocate(&segments, &request.budget);
        let timeline = build_timeline(&selection);

        let assembler = SummaryAssembler::new(
            Arc::clone(&self.backend),
            self.config.segments_dir.clone(),
        );
        if remove_if_exists(&request.manifest).await? {
            info!(manifest = %request.manifest.display(), "Removed previous summary manifest");
        }
        let duration = assembler.assemble(&selection, &request.output).await?;

        write_table(&request.manifest, &SummaryManifestRow::table(&timeline)).await?;
        info!(
            manifest = %request.manifest.display(),
            entries = timeline.len(),
            "Summary manifest written"
        );

        Ok(SummaryOutcome {
            selection,
            timeline,
            duration,
        })
    }
}
