//! Source recording models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifier of a recording, written to manifests as the `FILE` column.
///
/// Derived from the source file stem, so `lecture_03.mp4` becomes `lecture_03`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct RecordingId(pub String);

impl RecordingId {
    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Derive the identifier from a source path's file stem.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_stem()
            .map(|stem| Self(stem.to_string_lossy().into_owned()))
            .filter(|id| !id.0.is_empty())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RecordingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One input media file, loaded once and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recording {
    /// Identifier used in manifests and output folder names
    pub id: RecordingId,
    /// Source media path
    pub path: PathBuf,
    /// Total duration in seconds
    pub duration: f64,
    /// Audio sample rate of the source (Hz)
    pub sample_rate: u32,
    /// Audio channel count of the source
    pub channels: u16,
}
