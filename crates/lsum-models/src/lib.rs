//! Shared data models for lecture segmentation and summarization.
//!
//! This crate provides Serde-serializable types for:
//! - Recordings and the non-silent intervals detected in them
//! - Planned segment boundaries and classified segments
//! - Per-class summary budgets
//! - Summary selections and their timelines
//! - The `;`-delimited manifest tables exchanged between stages

pub mod budget;
pub mod manifest;
pub mod recording;
pub mod segment;
pub mod silence;
pub mod timeline;
pub mod timestamp;

// Re-export common types
pub use budget::{
    BudgetError, BudgetParseError, ClassBudgetSpec, ClassShare, SummaryTarget, COUNT_SHARE_SENTINEL,
};
pub use manifest::{
    classified_segments, format_decimal, DelimitedTable, ManifestError, SegmentManifestRow,
    SummaryManifestRow, DEFAULT_CLASS_COLUMN,
};
pub use recording::{Recording, RecordingId};
pub use segment::{segment_name, ClassLabel, ClassifiedSegment, Segment, SegmentBoundary};
pub use silence::SilenceInterval;
pub use timeline::{SelectedSegment, SummarySelection, TimelineEntry};
pub use timestamp::{format_precise, format_seconds, parse_timestamp, TimestampError};
