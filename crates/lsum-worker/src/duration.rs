//! Fills missing `DURATION` cells of a classified table by probing segment files.

use std::path::Path;
use tracing::{debug, info, warn};

use lsum_media::MediaBackend;
use lsum_models::manifest::{DURATION_COLUMN, FILE_COLUMN, SEG_COLUMN};
use lsum_models::{format_decimal, DelimitedTable, ManifestError, RecordingId};

use crate::workspace::segment_path;

/// What enrichment did to a table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichReport {
    /// Rows that received a duration
    pub filled: usize,
    /// Rows that already had one
    pub kept: usize,
    /// `(recording, segment)` pairs whose files could not be probed
    pub failed: Vec<(RecordingId, String)>,
}

/// Probe every row without a duration and write it in seconds.
///
/// Rows whose segment cannot be probed stay empty and are listed in the
/// report. The `DURATION` column is appended when the table lacks one.
pub async fn fill_durations(
    table: &mut DelimitedTable,
    segments_dir: &Path,
    backend: &dyn MediaBackend,
) -> Result<EnrichReport, ManifestError> {
    let file_col = table.require_column(FILE_COLUMN)?;
    let seg_col = table.require_column(SEG_COLUMN)?;
    let duration_col = table.ensure_column(DURATION_COLUMN);

    let mut report = EnrichReport::default();

    for row in 0..table.len() {
        let has_duration = table
            .get(row, duration_col)
            .is_some_and(|v| !v.trim().is_empty());
        if has_duration {
            report.kept += 1;
            continue;
        }

        let recording = RecordingId::from(table.get(row, file_col).unwrap_or_default());
        let segment = table.get(row, seg_col).unwrap_or_default().to_string();
        let path = segment_path(segments_dir, &recording, &segment);

        match backend.probe(&path).await {
            Ok(info) => {
                debug!(
                    recording = %recording,
                    segment = %segment,
                    duration = info.duration,
                    "Duration probed"
                );
                table.set(row, duration_col, format_decimal(info.duration));
                report.filled += 1;
            }
            Err(e) => {
                warn!(
                    recording = %recording,
                    segment = %segment,
                    path = %path.display(),
                    error = %e,
                    "Could not probe segment duration"
                );
                report.failed.push((recording, segment));
            }
        }
    }

    info!(
        filled = report.filled,
        kept = report.kept,
        failed = report.failed.len(),
        "Duration enrichment finished"
    );
    Ok(report)
}
