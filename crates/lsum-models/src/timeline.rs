//! Summary selection and timeline models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::recording::RecordingId;
use crate::segment::ClassLabel;

/// A labeled segment chosen for the summary, with a known duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SelectedSegment {
    pub recording: RecordingId,
    pub name: String,
    pub class: ClassLabel,
    /// Source duration in seconds
    pub duration: f64,
}

/// Chosen segments in assembly order, grouped by label in budget order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct SummarySelection {
    pub segments: Vec<SelectedSegment>,
}

impl SummarySelection {
    pub fn new(segments: Vec<SelectedSegment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedSegment> {
        self.segments.iter()
    }

    /// Sum of source durations; the assembled output should be close to this.
    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }

    /// Number of selected segments carrying `label`.
    pub fn count_for(&self, label: &ClassLabel) -> usize {
        self.segments.iter().filter(|s| &s.class == label).count()
    }
}

/// A selected segment and where it starts in the assembled output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimelineEntry {
    pub segment: SelectedSegment,
    /// Seconds from the start of the summary
    pub offset: f64,
}
