//! Segment planner configuration.

use serde::{Deserialize, Serialize};

/// Thresholds used by [`super::SegmentPlanner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Segments (other than the last) are kept strictly shorter than this, in seconds.
    pub up_bound: f64,

    /// A remainder shorter than this is merged into the last segment
    /// instead of standing alone.
    pub min_tail: f64,

    /// Added to the start of every segment but the first so that
    /// stream-copy cuts do not repeat the boundary frame.
    pub start_offset: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            up_bound: 20.0,
            min_tail: 6.0,
            start_offset: 0.01,
        }
    }
}

impl PlannerConfig {
    pub fn with_up_bound(mut self, up_bound: f64) -> Self {
        self.up_bound = up_bound;
        self
    }

    pub fn with_min_tail(mut self, min_tail: f64) -> Self {
        self.min_tail = min_tail;
        self
    }

    pub fn with_start_offset(mut self, offset: f64) -> Self {
        self.start_offset = offset;
        self
    }
}
