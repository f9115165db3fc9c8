//! On-disk layout of a segmentation run.
//!
//! ```text
//! <media_dir>/<recording>.mp4          source recordings (read only)
//! <audio_dir>/<recording>.f32          decoded mono audio
//! <segments_dir>/<manifest_name>       FILE;SEG manifest
//! <segments_dir>/<recording>/part_N.mp4
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use lsum_models::RecordingId;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

/// Extension of every cut segment file.
pub const SEGMENT_EXTENSION: &str = "mp4";

#[derive(Debug, Clone)]
pub struct Workspace {
    media_dir: PathBuf,
    audio_dir: PathBuf,
    segments_dir: PathBuf,
    manifest_name: String,
    media_extensions: Vec<String>,
}

impl Workspace {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            media_dir: config.media_dir.clone(),
            audio_dir: config.audio_dir.clone(),
            segments_dir: config.segments_dir.clone(),
            manifest_name: config.manifest_name.clone(),
            media_extensions: config.media_extensions.clone(),
        }
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    pub fn segments_dir(&self) -> &Path {
        &self.segments_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.segments_dir.join(&self.manifest_name)
    }

    pub fn audio_path(&self, recording: &RecordingId) -> PathBuf {
        self.audio_dir.join(format!("{}.f32", recording))
    }

    pub fn segment_path(&self, recording: &RecordingId, segment: &str) -> PathBuf {
        segment_path(&self.segments_dir, recording, segment)
    }

    /// Discard previous audio, segments and manifest, then recreate the directories.
    ///
    /// Safe to call repeatedly; source recordings are never touched.
    pub async fn reset(&self) -> PipelineResult<()> {
        for dir in [&self.audio_dir, &self.segments_dir] {
            match fs::remove_dir_all(dir).await {
                Ok(()) => debug!(dir = %dir.display(), "Cleared directory"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            fs::create_dir_all(dir).await?;
        }

        info!(
            audio_dir = %self.audio_dir.display(),
            segments_dir = %self.segments_dir.display(),
            "Workspace reset"
        );
        Ok(())
    }

    /// All source recordings in `media_dir`, sorted by file name.
    ///
    /// Recordings are named by file stem, so of `lecture.mkv` and
    /// `lecture.mp4` only the first in sorted order is kept.
    pub async fn discover_inputs(&self) -> PipelineResult<Vec<PathBuf>> {
        let mut inputs = Vec::new();
        let mut entries = fs::read_dir(&self.media_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() || is_hidden(&path) {
                continue;
            }
            if self.is_media_file(&path) {
                inputs.push(path);
            }
        }

        inputs.sort();
        let mut seen = HashSet::new();
        inputs.retain(|path| match RecordingId::from_path(path) {
            Some(id) if !seen.insert(id.clone()) => {
                warn!(
                    recording = %id,
                    path = %path.display(),
                    "Skipping source with a duplicate recording name"
                );
                false
            }
            _ => true,
        });
        debug!(
            media_dir = %self.media_dir.display(),
            inputs = inputs.len(),
            "Discovered source recordings"
        );
        Ok(inputs)
    }

    fn is_media_file(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.media_extensions.iter().any(|e| *e == ext))
    }
}

/// `<segments_dir>/<recording>/<segment>.mp4`
pub fn segment_path(segments_dir: &Path, recording: &RecordingId, segment: &str) -> PathBuf {
    segments_dir
        .join(recording.as_str())
        .join(format!("{}.{}", segment, SEGMENT_EXTENSION))
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|name| name.to_string_lossy().starts_with('.'))
}
