//! Configuration for energy-based silence detection.

use serde::{Deserialize, Serialize};

/// Parameters of [`super::EnergySilenceDetector`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergySilenceConfig {
    /// Analysis window length in seconds.
    pub st_win: f64,

    /// Hop between consecutive windows in seconds.
    pub st_step: f64,

    /// Position of the threshold between the quiet and loud energy levels.
    ///
    /// 0.0 puts it at the quiet level, 1.0 at the loud level.
    pub weight: f64,

    /// Fraction of frames averaged at each end of the sorted energies to
    /// estimate the quiet and loud levels.
    pub edge_fraction: f64,

    /// Non-silent runs shorter than this (seconds) are dropped.
    pub min_interval: f64,
}

impl Default for EnergySilenceConfig {
    fn default() -> Self {
        Self {
            st_win: 0.05,
            st_step: 0.05,
            weight: 0.5,
            edge_fraction: 0.1,
            min_interval: 0.2,
        }
    }
}

impl EnergySilenceConfig {
    pub fn with_window(mut self, st_win: f64, st_step: f64) -> Self {
        self.st_win = st_win;
        self.st_step = st_step;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight.clamp(0.0, 1.0);
        self
    }

    pub fn with_min_interval(mut self, secs: f64) -> Self {
        self.min_interval = secs.max(0.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EnergySilenceConfig::default();
        assert_eq!(config.st_win, 0.05);
        assert_eq!(config.st_step, 0.05);
        assert_eq!(config.weight, 0.5);
    }

    #[test]
    fn test_weight_is_clamped() {
        let config = EnergySilenceConfig::default().with_weight(1.7);
        assert_eq!(config.weight, 1.0);
    }
}
