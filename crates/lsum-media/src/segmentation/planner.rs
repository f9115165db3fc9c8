//! Greedy silence-aligned segment planner.
//!
//! # Algorithm
//!
//! 1. Candidate cut points are `0.0` followed by the midpoint of every
//!    non-silent interval.
//! 2. Starting at `0.0`, each window ends at the farthest candidate `c`
//!    with `c - start < up_bound`. If even the next candidate is out of
//!    reach the window still advances to it, so planning always terminates.
//! 3. A remainder shorter than `min_tail` extends the last window to the end
//!    of the recording; a longer one becomes its own final segment.
//! 4. Every segment but the first starts `start_offset` seconds late. A
//!    window too short to survive the offset is merged into the one before.

use thiserror::Error;
use tracing::{debug, warn};

use lsum_models::{SegmentBoundary, SilenceInterval};

use super::config::PlannerConfig;

/// Tolerance when checking intervals against the recording length.
const END_TOLERANCE: f64 = 1e-6;

/// Errors from segment planning. Planning fails as a whole; no partial plan is returned.
#[derive(Debug, Error, PartialEq)]
pub enum PlanningError {
    #[error("Invalid recording duration: {0}")]
    InvalidDuration(f64),

    #[error("Invalid segment upper bound: {0}")]
    InvalidUpperBound(f64),

    #[error("No non-silent intervals to plan from")]
    NoIntervals,

    #[error("Interval {index} is malformed: [{start}, {end}]")]
    MalformedInterval { index: usize, start: f64, end: f64 },

    #[error("Interval {index} starts before the previous one ends")]
    Overlapping { index: usize },

    #[error("Interval {index} ends at {end}s, past the recording end at {total}s")]
    BeyondRecording { index: usize, end: f64, total: f64 },
}

/// Plans segment boundaries with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct SegmentPlanner {
    config: PlannerConfig,
}

impl SegmentPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn plan(
        &self,
        total_duration: f64,
        intervals: &[SilenceInterval],
    ) -> Result<Vec<SegmentBoundary>, PlanningError> {
        plan_segments(total_duration, intervals, &self.config)
    }
}

/// Plan `[start, end]` boundaries covering `[0, total_duration]`.
pub fn plan_segments(
    total_duration: f64,
    intervals: &[SilenceInterval],
    config: &PlannerConfig,
) -> Result<Vec<SegmentBoundary>, PlanningError> {
    validate(total_duration, intervals, config)?;

    if intervals.len() == 1 {
        debug!("Single non-silent interval, planning one segment");
        return Ok(vec![SegmentBoundary::new(0.0, total_duration)]);
    }

    let candidates: Vec<f64> = std::iter::once(0.0)
        .chain(intervals.iter().map(SilenceInterval::midpoint))
        .collect();

    let mut boundaries = greedy_windows(&candidates, config.up_bound);
    regularize_tail(&mut boundaries, total_duration, config.min_tail);

    let boundaries = apply_start_offset(boundaries, config.start_offset);

    debug!(
        total_duration,
        candidates = candidates.len(),
        segments = boundaries.len(),
        "Planned segments"
    );

    Ok(boundaries)
}

fn validate(
    total: f64,
    intervals: &[SilenceInterval],
    config: &PlannerConfig,
) -> Result<(), PlanningError> {
    if !total.is_finite() || total <= 0.0 {
        return Err(PlanningError::InvalidDuration(total));
    }
    if !config.up_bound.is_finite() || config.up_bound <= 0.0 {
        return Err(PlanningError::InvalidUpperBound(config.up_bound));
    }
    if intervals.is_empty() {
        return Err(PlanningError::NoIntervals);
    }

    let mut prev_end = 0.0;
    for (index, interval) in intervals.iter().enumerate() {
        let SilenceInterval { start, end } = *interval;
        if !start.is_finite() || !end.is_finite() || start < 0.0 || start >= end {
            return Err(PlanningError::MalformedInterval { index, start, end });
        }
        if index > 0 && start < prev_end {
            return Err(PlanningError::Overlapping { index });
        }
        if end > total + END_TOLERANCE {
            return Err(PlanningError::BeyondRecording { index, end, total });
        }
        prev_end = end;
    }

    Ok(())
}

/// Greedy windows over strictly increasing candidates starting at `candidates[0]`.
fn greedy_windows(candidates: &[f64], up_bound: f64) -> Vec<SegmentBoundary> {
    let mut boundaries = Vec::new();
    let mut start = candidates[0];
    let mut cursor = 1;

    while cursor < candidates.len() {
        let mut next = cursor;
        if candidates[cursor] - start >= up_bound {
            warn!(
                start,
                next = candidates[cursor],
                up_bound,
                "No cut point within the upper bound, forcing one"
            );
        } else {
            while next + 1 < candidates.len() && candidates[next + 1] - start < up_bound {
                next += 1;
            }
        }

        let end = candidates[next];
        boundaries.push(SegmentBoundary::new(start, end));
        start = end;
        cursor = next + 1;
    }

    boundaries
}

/// Delay every start but the first by `offset`.
///
/// A window no longer than `offset` would end before it starts, so it is
/// folded into the segment before it.
fn apply_start_offset(boundaries: Vec<SegmentBoundary>, offset: f64) -> Vec<SegmentBoundary> {
    let mut shifted: Vec<SegmentBoundary> = Vec::with_capacity(boundaries.len());

    for boundary in boundaries {
        match shifted.last_mut() {
            None => shifted.push(boundary),
            Some(prev) if boundary.start + offset >= boundary.end => {
                debug!(
                    start = boundary.start,
                    end = boundary.end,
                    "Window shorter than the start offset, merging"
                );
                prev.end = boundary.end;
            }
            Some(_) => shifted.push(SegmentBoundary::new(boundary.start + offset, boundary.end)),
        }
    }

    shifted
}

fn regularize_tail(boundaries: &mut Vec<SegmentBoundary>, total: f64, min_tail: f64) {
    let last_end = boundaries.last().map_or(0.0, |b| b.end);
    let remainder = total - last_end;

    match boundaries.last_mut() {
        Some(last) if remainder < min_tail => last.end = total,
        _ => boundaries.push(SegmentBoundary::new(last_end, total)),
    }
}
