//! Segment models.
//!
//! A [`Segment`] is what the planner and cutter produce for a recording.
//! A [`ClassifiedSegment`] is the same unit after the external classifier
//! has attached a label, as read back from the classified table.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::recording::RecordingId;

/// Segment file names are `part_<index>` within a recording's folder.
pub fn segment_name(index: usize) -> String {
    format!("part_{}", index)
}

/// Planned `[start, end]` span of a segment, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentBoundary {
    pub start: f64,
    pub end: f64,
}

impl SegmentBoundary {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A segment that has been cut to its own media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// Recording the segment was cut from (`FILE`)
    pub recording: RecordingId,
    /// Segment name within the recording (`SEG`)
    pub name: String,
    /// Span within the source recording
    pub boundary: SegmentBoundary,
}

impl Segment {
    pub fn duration(&self) -> f64 {
        self.boundary.duration()
    }
}

/// Class label assigned by the external classifier, e.g. `boring`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ClassLabel(pub String);

impl ClassLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClassLabel {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One row of the classified-segment table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClassifiedSegment {
    pub recording: RecordingId,
    pub name: String,
    /// Missing when the classifier left the row unlabeled
    pub class: Option<ClassLabel>,
    /// Missing until the duration column has been filled
    pub duration: Option<f64>,
}

impl ClassifiedSegment {
    pub fn new(
        recording: impl Into<RecordingId>,
        name: impl Into<String>,
        class: Option<ClassLabel>,
        duration: Option<f64>,
    ) -> Self {
        Self {
            recording: recording.into(),
            name: name.into(),
            class,
            duration,
        }
    }
}
