//! Pipeline error types.
//!
//! Every variant names the recording, segment, or output it concerns.

use std::path::PathBuf;
use thiserror::Error;

use lsum_media::{MediaError, PlanningError};
use lsum_models::budget::BudgetParseError;
use lsum_models::{ManifestError, RecordingId};

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Planning failed for recording '{recording}': {source}")]
    Planning {
        recording: RecordingId,
        source: PlanningError,
    },

    #[error("Cutting {segment} of recording '{recording}' failed: {source}")]
    Cut {
        recording: RecordingId,
        segment: String,
        source: MediaError,
    },

    #[error("Reading recording '{recording}' failed: {source}")]
    Recording {
        recording: RecordingId,
        source: MediaError,
    },

    #[error("Segment {segment} of recording '{recording}' is missing at {}", path.display())]
    MissingSegment {
        recording: RecordingId,
        segment: String,
        path: PathBuf,
    },

    #[error("Assembling {} failed: {source}", output.display())]
    Assembly { output: PathBuf, source: MediaError },

    #[error("Nothing selected for {}", output.display())]
    EmptySelection { output: PathBuf },

    #[error("Manifest {} is invalid: {source}", path.display())]
    Manifest {
        path: PathBuf,
        source: ManifestError,
    },

    #[error("Budget error: {0}")]
    Budget(#[from] BudgetParseError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn manifest(path: impl Into<PathBuf>, source: ManifestError) -> Self {
        Self::Manifest {
            path: path.into(),
            source,
        }
    }

    /// Whether the error belongs to summary assembly.
    pub fn is_assembly_failure(&self) -> bool {
        matches!(
            self,
            Self::Assembly { .. } | Self::MissingSegment { .. } | Self::EmptySelection { .. }
        )
    }

    /// The recording an error concerns, if any.
    pub fn recording(&self) -> Option<&RecordingId> {
        match self {
            Self::Planning { recording, .. }
            | Self::Cut { recording, .. }
            | Self::Recording { recording, .. }
            | Self::MissingSegment { recording, .. } => Some(recording),
            _ => None,
        }
    }
}
