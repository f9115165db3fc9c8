//! Short-term energy silence detector.

use lsum_models::SilenceInterval;
use tracing::debug;

use super::config::EnergySilenceConfig;
use super::SilenceIntervalSource;
use crate::waveform::Waveform;

/// Mean-square energy below which a flat signal counts as silence.
const SILENCE_FLOOR: f64 = 1e-8;

/// Thresholds windowed energy halfway (by default) between the quiet and
/// loud levels of the recording itself.
#[derive(Debug, Clone, Default)]
pub struct EnergySilenceDetector {
    config: EnergySilenceConfig,
}

impl EnergySilenceDetector {
    pub fn new(config: EnergySilenceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnergySilenceConfig {
        &self.config
    }

    /// Threshold between the mean of the quietest and loudest frames,
    /// or `None` if the signal is flat.
    fn threshold(&self, energies: &[f64]) -> Option<f64> {
        let mut sorted = energies.to_vec();
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let k = ((n as f64 * self.config.edge_fraction).floor() as usize).clamp(1, n);
        let low = mean(&sorted[..k]);
        let high = mean(&sorted[n - k..]);

        if high - low <= f64::EPSILON {
            return None;
        }
        Some(low + self.config.weight * (high - low))
    }

    fn push_interval(&self, intervals: &mut Vec<SilenceInterval>, start: f64, end: f64) {
        // Overlapping windows can make neighbours touch; keep them disjoint.
        let start = intervals.last().map_or(start, |last| start.max(last.end));
        if end - start >= self.config.min_interval {
            intervals.push(SilenceInterval::new(start, end));
        }
    }
}

impl SilenceIntervalSource for EnergySilenceDetector {
    fn detect(&self, waveform: &Waveform) -> Vec<SilenceInterval> {
        if waveform.is_empty() || waveform.sample_rate == 0 {
            return Vec::new();
        }

        let sample_rate = waveform.sample_rate as f64;
        let window = ((self.config.st_win * sample_rate).round() as usize).max(1);
        let step = ((self.config.st_step * sample_rate).round() as usize).max(1);
        let total = waveform.duration();

        let energies = frame_energies(&waveform.samples, window, step);

        let Some(threshold) = self.threshold(&energies) else {
            debug!("Flat signal, treating as a single interval or pure silence");
            return if energies[0] > SILENCE_FLOOR {
                vec![SilenceInterval::new(0.0, total)]
            } else {
                Vec::new()
            };
        };

        let mut intervals = Vec::new();
        let mut open: Option<(f64, f64)> = None;

        for (i, &energy) in energies.iter().enumerate() {
            let start = (i * step) as f64 / sample_rate;
            let end = ((i * step + window) as f64 / sample_rate).min(total);

            if energy > threshold {
                open = Some(match open {
                    Some((s, _)) => (s, end),
                    None => (start, end),
                });
            } else if let Some((s, e)) = open.take() {
                self.push_interval(&mut intervals, s, e);
            }
        }
        if let Some((s, e)) = open {
            self.push_interval(&mut intervals, s, e);
        }

        debug!(
            frames = energies.len(),
            threshold,
            intervals = intervals.len(),
            "Silence detection complete"
        );

        intervals
    }
}

/// Mean-square energy of each window; the last window may be partial.
fn frame_energies(samples: &[f32], window: usize, step: usize) -> Vec<f64> {
    let mut energies = Vec::new();
    let mut idx = 0;
    while idx < samples.len() {
        let end = (idx + window).min(samples.len());
        let frame = &samples[idx..end];
        let sum: f64 = frame.iter().map(|&s| (s as f64) * (s as f64)).sum();
        energies.push(sum / frame.len() as f64);
        idx += step;
    }
    energies
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1_000;

    fn waveform(parts: &[(f32, usize)]) -> Waveform {
        let samples = parts
            .iter()
            .flat_map(|&(amp, len)| std::iter::repeat(amp).take(len))
            .collect();
        Waveform::new(samples, RATE)
    }

    fn assert_interval(interval: &SilenceInterval, start: f64, end: f64) {
        assert!(
            (interval.start - start).abs() < 1e-9 && (interval.end - end).abs() < 1e-9,
            "expected [{start}, {end}], got [{}, {}]",
            interval.start,
            interval.end
        );
    }

    #[test]
    fn detects_speech_around_a_pause() {
        let audio = waveform(&[(0.5, 2_000), (0.0, 1_000), (0.5, 2_000)]);
        let intervals = EnergySilenceDetector::default().detect(&audio);

        assert_eq!(intervals.len(), 2);
        assert_interval(&intervals[0], 0.0, 2.0);
        assert_interval(&intervals[1], 3.0, 5.0);
    }

    #[test]
    fn drops_short_bursts() {
        let audio = waveform(&[
            (0.5, 1_000),
            (0.0, 1_000),
            (0.5, 100),
            (0.0, 1_000),
            (0.5, 1_000),
        ]);
        let intervals = EnergySilenceDetector::default().detect(&audio);

        assert_eq!(intervals.len(), 2);
        assert_interval(&intervals[0], 0.0, 1.0);
        assert_interval(&intervals[1], 3.1, 4.1);
    }

    #[test]
    fn flat_tone_is_one_interval() {
        let audio = waveform(&[(0.3, 3_000)]);
        let intervals = EnergySilenceDetector::default().detect(&audio);

        assert_eq!(intervals.len(), 1);
        assert_interval(&intervals[0], 0.0, 3.0);
    }

    #[test]
    fn pure_silence_has_no_intervals() {
        let audio = waveform(&[(0.0, 3_000)]);
        assert!(EnergySilenceDetector::default().detect(&audio).is_empty());
        assert!(EnergySilenceDetector::default()
            .detect(&Waveform::new(Vec::new(), RATE))
            .is_empty());
    }

    #[test]
    fn overlapping_windows_stay_disjoint() {
        let config = EnergySilenceConfig::default()
            .with_window(0.1, 0.05)
            .with_min_interval(0.0);
        let audio = waveform(&[(0.5, 1_000), (0.0, 500), (0.5, 1_000)]);
        let intervals = EnergySilenceDetector::new(config).detect(&audio);

        assert!(intervals.len() >= 2);
        for pair in intervals.windows(2) {
            assert!(pair[0].end <= pair[1].start);
            assert!(pair[1].start < pair[1].end);
        }
    }
}
