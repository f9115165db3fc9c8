//! Non-silent interval model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A stretch of audio bounded by silence on both sides, in seconds.
///
/// Detectors emit these ordered by time and non-overlapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SilenceInterval {
    pub start: f64,
    pub end: f64,
}

impl SilenceInterval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Candidate cut point for the planner.
    pub fn midpoint(&self) -> f64 {
        self.start + 0.5 * (self.end - self.start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midpoint() {
        let interval = SilenceInterval::new(10.0, 14.0);
        assert_eq!(interval.midpoint(), 12.0);
        assert_eq!(interval.duration(), 4.0);
    }
}
