//! Manifest file I/O.
//!
//! The segment manifest is shared by all recordings of a run, so rows go
//! through a single [`ManifestWriter`] that serializes appends. Whole-table
//! outputs are written to a temporary sibling and renamed into place.

use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use lsum_media::fs_utils::{move_file, remove_if_exists, temp_sibling};
use lsum_models::{classified_segments, ClassifiedSegment, DelimitedTable, SegmentManifestRow};

use crate::error::{PipelineError, PipelineResult};

/// Append-only writer for the `FILE;SEG` manifest.
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    file: Mutex<File>,
}

impl ManifestWriter {
    /// Open `path` for appending, writing the header if the file is new or empty.
    pub async fn open(path: impl Into<PathBuf>) -> PipelineResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        if file.metadata().await?.len() == 0 {
            file.write_all(format!("{}\n", SegmentManifestRow::HEADER).as_bytes())
                .await?;
            file.flush().await?;
        }

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row. Concurrent callers are serialized; each row is flushed.
    pub async fn append(&self, row: &SegmentManifestRow) -> PipelineResult<()> {
        let line = format!("{}\n", row.render());
        let mut file = self.file.lock().await;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        debug!(file = %row.file, seg = %row.seg, "Manifest row appended");
        Ok(())
    }
}

/// Read any `;`-delimited table.
pub async fn read_table(path: &Path) -> PipelineResult<DelimitedTable> {
    let text = fs::read_to_string(path).await?;
    DelimitedTable::parse(&text).map_err(|e| PipelineError::manifest(path, e))
}

/// Read the classified-segment table with labels from `class_column`.
pub async fn read_classified(
    path: &Path,
    class_column: &str,
) -> PipelineResult<Vec<ClassifiedSegment>> {
    let table = read_table(path).await?;
    classified_segments(&table, class_column).map_err(|e| PipelineError::manifest(path, e))
}

/// Replace `path` with `table` atomically.
pub async fn write_table(path: &Path, table: &DelimitedTable) -> PipelineResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp = temp_sibling(path);
    fs::write(&tmp, table.render()).await?;
    if let Err(e) = move_file(&tmp, path).await {
        remove_if_exists(&tmp).await.ok();
        return Err(e.into());
    }
    Ok(())
}
