//! Silence-aligned segment planning.
//!
//! Turns the non-silent intervals of a recording into contiguous,
//! duration-bounded segment boundaries covering the whole recording.

mod config;
mod planner;

pub use config::PlannerConfig;
pub use planner::{plan_segments, PlanningError, SegmentPlanner};
