//! Joins selected segment files into the summary video.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use lsum_media::fs_utils::{ensure_non_empty, move_file, remove_if_exists, temp_sibling};
use lsum_media::{MediaBackend, MediaResult};
use lsum_models::SummarySelection;

use crate::error::{PipelineError, PipelineResult};
use crate::workspace::segment_path;

/// Concatenates selected segments, in selection order, into one file.
///
/// The output is produced at a temporary sibling and renamed into place,
/// so a failed run never leaves a partial file at the output path. A
/// previous output is removed before concatenation starts.
#[derive(Clone)]
pub struct SummaryAssembler {
    backend: Arc<dyn MediaBackend>,
    segments_dir: PathBuf,
}

impl SummaryAssembler {
    pub fn new(backend: Arc<dyn MediaBackend>, segments_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            segments_dir: segments_dir.into(),
        }
    }

    /// Segment files for `selection`, failing on the first one that is missing.
    pub fn resolve_inputs(&self, selection: &SummarySelection) -> PipelineResult<Vec<PathBuf>> {
        selection
            .iter()
            .map(|s| {
                let path = segment_path(&self.segments_dir, &s.recording, &s.name);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(PipelineError::MissingSegment {
                        recording: s.recording.clone(),
                        segment: s.name.clone(),
                        path,
                    })
                }
            })
            .collect()
    }

    /// Assemble `selection` into `output` and return the output's duration.
    pub async fn assemble(
        &self,
        selection: &SummarySelection,
        output: &Path,
    ) -> PipelineResult<f64> {
        if selection.is_empty() {
            return Err(PipelineError::EmptySelection {
                output: output.to_path_buf(),
            });
        }

        let inputs = self.resolve_inputs(selection)?;
        let assembly_failed = |source| PipelineError::Assembly {
            output: output.to_path_buf(),
            source,
        };

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        if remove_if_exists(output).await.map_err(assembly_failed)? {
            info!(output = %output.display(), "Removed previous summary");
        }

        let tmp = temp_sibling(output);
        let produced: MediaResult<()> = async {
            self.backend.concat(&inputs, &tmp).await?;
            ensure_non_empty(&tmp).await?;
            move_file(&tmp, output).await
        }
        .await;

        if let Err(e) = produced {
            if let Err(cleanup) = remove_if_exists(&tmp).await {
                warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temporary output");
            }
            return Err(assembly_failed(e));
        }

        let duration = self
            .backend
            .probe(output)
            .await
            .map_err(assembly_failed)?
            .duration;

        let expected = selection.total_duration();
        if (duration - expected).abs() > 1.0 {
            warn!(
                output = %output.display(),
                duration,
                expected,
                "Summary duration differs from the sum of its segments"
            );
        }

        info!(
            output = %output.display(),
            segments = selection.len(),
            duration,
            "Summary assembled"
        );
        Ok(duration)
    }
}
