//! Stream-copy segment extraction.
//!
//! Cuts are lossless, so they snap to the nearest preceding keyframe and
//! may start slightly early. The planner's start offset keeps consecutive
//! segments from sharing a boundary frame.

use std::path::Path;
use tracing::{debug, info};

use lsum_models::SegmentBoundary;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::ensure_non_empty;

/// Extract `boundary` of `input` into `output` without re-encoding.
///
/// Fails with [`MediaError::MissingOutput`] if FFmpeg exits cleanly but
/// writes nothing.
pub async fn extract_segment(
    input: &Path,
    output: &Path,
    boundary: SegmentBoundary,
    runner: &FfmpegRunner,
) -> MediaResult<()> {
    let duration = boundary.duration();
    if !boundary.start.is_finite() || boundary.start < 0.0 || !(duration > 0.0) {
        return Err(MediaError::InvalidRange {
            start: boundary.start,
            duration,
        });
    }

    if !input.exists() {
        return Err(MediaError::FileNotFound(input.to_path_buf()));
    }

    if let Some(parent) = output.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    debug!(
        input = %input.display(),
        output = %output.display(),
        start = boundary.start,
        duration,
        "Extracting segment"
    );

    let cmd = FfmpegCommand::new(input, output)
        .seek(boundary.start)
        .duration(duration)
        .codec_copy();

    runner.run(&cmd).await?;
    let size = ensure_non_empty(output).await?;

    info!(
        output = %output.display(),
        bytes = size,
        "Extracted segment {:.3}s..{:.3}s",
        boundary.start,
        boundary.end
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_empty_range() {
        let runner = FfmpegRunner::new();
        let result = extract_segment(
            Path::new("lecture.mp4"),
            Path::new("part_0.mp4"),
            SegmentBoundary::new(10.0, 10.0),
            &runner,
        )
        .await;
        assert!(matches!(result, Err(MediaError::InvalidRange { .. })));
    }

    #[tokio::test]
    async fn test_rejects_missing_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let runner = FfmpegRunner::new();
        let result = extract_segment(
            &dir.path().join("missing.mp4"),
            &dir.path().join("part_0.mp4"),
            SegmentBoundary::new(0.0, 5.0),
            &runner,
        )
        .await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
