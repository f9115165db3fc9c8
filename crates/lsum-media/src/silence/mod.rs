//! Non-silent interval detection.
//!
//! The planner only needs an ordered list of non-silent intervals. Any
//! detector can provide it through [`SilenceIntervalSource`]; the built-in
//! [`EnergySilenceDetector`] thresholds short-term frame energy.

mod config;
mod detector;

pub use config::EnergySilenceConfig;
pub use detector::EnergySilenceDetector;

use lsum_models::SilenceInterval;

use crate::waveform::Waveform;

/// Produces ordered, non-overlapping non-silent intervals in seconds.
pub trait SilenceIntervalSource: Send + Sync {
    fn detect(&self, waveform: &Waveform) -> Vec<SilenceInterval>;
}
