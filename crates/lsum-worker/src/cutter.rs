//! Cuts planned boundaries into segment files and records them.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use lsum_media::MediaBackend;
use lsum_models::{segment_name, Recording, Segment, SegmentBoundary, SegmentManifestRow};

use crate::error::{PipelineError, PipelineResult};
use crate::manifest::ManifestWriter;
use crate::workspace::segment_path;

/// Produces `<segments_dir>/<recording>/part_N.mp4` files and manifest rows.
///
/// A row is appended only after its file exists. The first failed trim
/// aborts the rest of that recording; earlier segments and rows stay.
#[derive(Clone)]
pub struct MediaCutter {
    backend: Arc<dyn MediaBackend>,
    segments_dir: PathBuf,
    manifest: Arc<ManifestWriter>,
}

impl MediaCutter {
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        segments_dir: impl Into<PathBuf>,
        manifest: Arc<ManifestWriter>,
    ) -> Self {
        Self {
            backend,
            segments_dir: segments_dir.into(),
            manifest,
        }
    }

    pub async fn cut(
        &self,
        recording: &Recording,
        boundaries: &[SegmentBoundary],
    ) -> PipelineResult<Vec<Segment>> {
        let mut segments = Vec::with_capacity(boundaries.len());

        for (index, boundary) in boundaries.iter().enumerate() {
            let name = segment_name(index);
            let output = segment_path(&self.segments_dir, &recording.id, &name);

            let cut_failed = |source| PipelineError::Cut {
                recording: recording.id.clone(),
                segment: name.clone(),
                source,
            };

            self.backend
                .trim(&recording.path, &output, *boundary)
                .await
                .map_err(cut_failed)?;

            if !output.is_file() {
                return Err(cut_failed(lsum_media::MediaError::MissingOutput(output)));
            }

            let segment = Segment {
                recording: recording.id.clone(),
                name,
                boundary: *boundary,
            };
            self.manifest
                .append(&SegmentManifestRow::from_segment(&segment))
                .await?;

            debug!(
                recording = %segment.recording,
                segment = %segment.name,
                start = boundary.start,
                end = boundary.end,
                "Segment cut"
            );
            segments.push(segment);
        }

        Ok(segments)
    }
}
