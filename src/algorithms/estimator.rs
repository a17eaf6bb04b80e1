#[allow(unused_imports)]
use micromath::F32Ext;

use crate::{config::EstimatorConfig, sliding::SlidingWindow, time::*};

/// Number of beat timestamps kept for rate estimation.
pub const HISTORY_LEN: usize = 10;

/// Most recent beat timestamps, oldest overwritten first.
pub struct BeatHistory {
    beats: SlidingWindow<Timestamp, [Timestamp; HISTORY_LEN]>,
}

impl BeatHistory {
    pub fn new() -> Self {
        Self {
            beats: SlidingWindow::default(),
        }
    }

    pub fn clear(&mut self) {
        self.beats.clear();
    }

    pub fn push(&mut self, at: Timestamp) {
        self.beats.push(at);
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    /// Intervals between adjacent recorded beats, oldest pair first.
    pub fn intervals(&self) -> impl Iterator<Item = Millis> + '_ {
        let beats = self.beats.iter();
        beats
            .clone()
            .zip(beats.skip(1))
            .map(|(earlier, later)| later.since(earlier))
    }
}

impl Default for BeatHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BpmEstimate {
    /// Rate from the averaged plausible intervals, if there were any.
    pub instantaneous: Option<u16>,
    /// Reported rate, always within the configured clamp.
    pub smoothed: u16,
}

pub struct BpmEstimator {
    history: BeatHistory,
    estimate: BpmEstimate,
    config: EstimatorConfig,
}

impl BpmEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            history: BeatHistory::new(),
            estimate: Self::baseline(&config),
            config,
        }
    }

    fn baseline(config: &EstimatorConfig) -> BpmEstimate {
        BpmEstimate {
            instantaneous: None,
            smoothed: config.base_bpm,
        }
    }

    /// Forgets all beats and reports the base rate again.
    pub fn clear(&mut self) {
        self.history.clear();
        self.estimate = Self::baseline(&self.config);
    }

    pub fn estimate(&self) -> BpmEstimate {
        self.estimate
    }

    pub fn bpm(&self) -> u16 {
        self.estimate.smoothed
    }

    pub fn history(&self) -> &BeatHistory {
        &self.history
    }

    /// Records a beat and recomputes the estimate.
    pub fn on_beat(&mut self, at: Timestamp) -> BpmEstimate {
        self.history.push(at);
        self.estimate = self.recompute();
        self.estimate
    }

    fn recompute(&self) -> BpmEstimate {
        let band = self.config.band;
        let (total, count) = self
            .history
            .intervals()
            .filter(|interval| band.contains(*interval))
            .fold((0u32, 0u32), |(total, count), interval| {
                (total + interval.as_millis(), count + 1)
            });

        if count == 0 {
            return Self::baseline(&self.config);
        }

        // The band's lower bound keeps the average well away from zero
        let average = total / count;
        let instantaneous = 60_000 / average;

        let alpha = self.config.alpha;
        let blended = f32::from(self.config.base_bpm) * (1.0 - alpha) + instantaneous as f32 * alpha;
        let smoothed = (blended.round() as u16).clamp(self.config.min_bpm, self.config.max_bpm);

        log::debug!("bpm {} (raw {}, {} intervals)", smoothed, instantaneous, count);

        BpmEstimate {
            instantaneous: Some(instantaneous as u16),
            smoothed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beats(estimator: &mut BpmEstimator, times: &[u32]) -> BpmEstimate {
        times
            .iter()
            .map(|&t| estimator.on_beat(Timestamp::from_millis(t)))
            .last()
            .unwrap()
    }

    #[test]
    fn rate_from_single_interval() {
        let mut estimator = BpmEstimator::new(EstimatorConfig::default());

        let estimate = beats(&mut estimator, &[1000, 1800]);
        assert_eq!(estimate.instantaneous, Some(75));
        // 60 * 0.8 + 75 * 0.2
        assert_eq!(estimate.smoothed, 63);
    }

    #[test]
    fn lone_beat_reports_base_rate() {
        let mut estimator = BpmEstimator::new(EstimatorConfig::default());

        let estimate = beats(&mut estimator, &[1000]);
        assert_eq!(estimate.instantaneous, None);
        assert_eq!(estimate.smoothed, 60);
    }

    #[test]
    fn implausible_intervals_are_skipped() {
        let mut estimator = BpmEstimator::new(EstimatorConfig::default());

        // 2200 ms gap is ignored, the two 1000 ms intervals remain
        let estimate = beats(&mut estimator, &[1000, 3200, 4200, 5200]);
        assert_eq!(estimate.instantaneous, Some(60));

        let mut estimator = BpmEstimator::new(EstimatorConfig::default());
        let estimate = beats(&mut estimator, &[1000, 3200]);
        assert_eq!(estimate.instantaneous, None);
        assert_eq!(estimate.smoothed, 60);
    }

    #[test]
    fn averages_recent_intervals_only() {
        let mut estimator = BpmEstimator::new(EstimatorConfig::default());

        // Twelve beats 500 ms apart, then the history only holds the last ten
        let times: Vec<u32> = (0..12).map(|i| 1000 + i * 500).collect();
        beats(&mut estimator, &times);
        assert_eq!(estimator.history().len(), HISTORY_LEN);
        assert_eq!(estimator.history().intervals().count(), HISTORY_LEN - 1);
        assert_eq!(estimator.estimate().instantaneous, Some(120));
    }

    #[test]
    fn output_stays_within_clamp() {
        let config = EstimatorConfig {
            alpha: 1.0,
            ..EstimatorConfig::default()
        };

        let mut estimator = BpmEstimator::new(config);
        let estimate = beats(&mut estimator, &[1000, 1340, 1680, 2020]);
        assert_eq!(estimate.instantaneous, Some(176));
        assert!(estimate.smoothed <= 200);

        let mut estimator = BpmEstimator::new(EstimatorConfig {
            max_bpm: 150,
            ..config
        });
        let estimate = beats(&mut estimator, &[1000, 1340, 1680]);
        assert_eq!(estimate.smoothed, 150);

        let mut estimator = BpmEstimator::new(EstimatorConfig {
            min_bpm: 40,
            ..config
        });
        let estimate = beats(&mut estimator, &[1000, 2990]);
        assert_eq!(estimate.instantaneous, Some(30));
        assert_eq!(estimate.smoothed, 40);
    }

    #[test]
    fn clear_restores_base_rate() {
        let mut estimator = BpmEstimator::new(EstimatorConfig::default());
        beats(&mut estimator, &[1000, 1800, 2600]);
        estimator.clear();

        assert!(estimator.history().is_empty());
        assert_eq!(estimator.bpm(), 60);
    }
}
