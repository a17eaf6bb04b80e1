use crate::{config::DetectorConfig, time::*};

/// A detected rising edge of the pulse.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeatEvent {
    pub at: Timestamp,
    /// Time since the previous beat, if that beat belongs to the same train and the interval is
    /// plausible. `None` for the first beat, and for a beat after a gap longer than the band.
    pub interval: Option<Millis>,
}

/// Derivative-gated threshold crossing detector.
pub struct BeatDetector {
    /// Set between an accepted rising edge and the following falling edge
    in_pulse: bool,
    last_beat: Option<Timestamp>,
    last_debounce: Option<Timestamp>,
    config: DetectorConfig,
}

impl BeatDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            in_pulse: false,
            last_beat: None,
            last_debounce: None,
            config,
        }
    }

    /// Re-arms the detector and forgets previous beats.
    pub fn clear(&mut self) {
        self.in_pulse = false;
        self.last_beat = None;
        self.last_debounce = None;
    }

    pub fn last_beat(&self) -> Option<Timestamp> {
        self.last_beat
    }

    pub fn in_pulse(&self) -> bool {
        self.in_pulse
    }

    fn debounced(&self, now: Timestamp) -> bool {
        match self.last_debounce {
            Some(t) => now.since(t) > self.config.debounce,
            None => true,
        }
    }

    /// Processes one filtered value. Returns a beat if a rising edge was accepted.
    pub fn update(
        &mut self,
        now: Timestamp,
        filtered: f32,
        derivative: f32,
        threshold: f32,
    ) -> Option<BeatEvent> {
        if self.in_pulse {
            if filtered < threshold && derivative < 0.0 {
                self.in_pulse = false;
            }
            return None;
        }

        if !(filtered > threshold && derivative > 0.0 && self.debounced(now)) {
            return None;
        }

        self.in_pulse = true;

        let interval = self.last_beat.map(|t| now.since(t));
        let interval = match interval {
            Some(interval) if interval <= self.config.band.min => {
                // Double trigger on the same pulse. Stay in the pulse but don't count it.
                log::trace!("rejected beat after {:?}", interval);
                return None;
            }
            Some(interval) if interval >= self.config.band.max => {
                // Contact was lost for a while, start a new train of beats
                log::trace!("beat after {:?} gap restarts the beat train", interval);
                None
            }
            other => other,
        };

        self.last_beat = Some(now);
        self.last_debounce = Some(now);

        log::trace!("beat at {}ms", now.raw());
        Some(BeatEvent { at: now, interval })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THRESHOLD: f32 = 500.0;

    fn at(ms: u32) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    /// Rising crossing at `t`, followed by the falling edge 300 ms later.
    fn pulse(detector: &mut BeatDetector, t: u32) -> Option<BeatEvent> {
        let beat = detector.update(at(t), 520.0, 5.0, THRESHOLD);
        detector.update(at(t.wrapping_add(300)), 480.0, -5.0, THRESHOLD);
        beat
    }

    #[test]
    fn accepts_beats_within_band() {
        let mut detector = BeatDetector::new(DetectorConfig::default());

        assert_eq!(
            pulse(&mut detector, 1000),
            Some(BeatEvent {
                at: at(1000),
                interval: None
            })
        );
        assert_eq!(
            pulse(&mut detector, 1800),
            Some(BeatEvent {
                at: at(1800),
                interval: Some(800.ms())
            })
        );
        assert_eq!(detector.last_beat(), Some(at(1800)));
    }

    #[test]
    fn debounce_blocks_early_crossing() {
        let mut detector = BeatDetector::new(DetectorConfig::default());

        assert!(detector.update(at(1000), 520.0, 5.0, THRESHOLD).is_some());
        detector.update(at(1100), 480.0, -5.0, THRESHOLD);
        assert_eq!(detector.update(at(1200), 520.0, 5.0, THRESHOLD), None);
        assert_eq!(detector.last_beat(), Some(at(1000)));
    }

    #[test]
    fn interval_gate_rejects_double_trigger() {
        let mut config = DetectorConfig::default();
        config.debounce = 100.ms();
        let mut detector = BeatDetector::new(config);

        assert!(detector.update(at(1000), 520.0, 5.0, THRESHOLD).is_some());
        detector.update(at(1100), 480.0, -5.0, THRESHOLD);
        assert_eq!(detector.update(at(1200), 520.0, 5.0, THRESHOLD), None);
        assert!(detector.in_pulse());
        assert_eq!(detector.last_beat(), Some(at(1000)));
    }

    #[test]
    fn long_gap_restarts_train() {
        let mut detector = BeatDetector::new(DetectorConfig::default());

        pulse(&mut detector, 1000);
        let beat = pulse(&mut detector, 3200);
        assert_eq!(
            beat,
            Some(BeatEvent {
                at: at(3200),
                interval: None
            })
        );

        let beat = pulse(&mut detector, 4000);
        assert_eq!(beat.and_then(|b| b.interval), Some(800.ms()));
    }

    #[test]
    fn requires_rising_slope() {
        let mut detector = BeatDetector::new(DetectorConfig::default());

        // Above threshold, but drifting down
        assert_eq!(detector.update(at(1000), 520.0, -1.0, THRESHOLD), None);
        assert_eq!(detector.update(at(1010), 520.0, 0.0, THRESHOLD), None);
        assert!(!detector.in_pulse());
    }

    #[test]
    fn falling_edge_needs_falling_slope() {
        let mut detector = BeatDetector::new(DetectorConfig::default());

        detector.update(at(1000), 520.0, 5.0, THRESHOLD);
        detector.update(at(1100), 480.0, 1.0, THRESHOLD);
        assert!(detector.in_pulse());
        detector.update(at(1110), 470.0, -10.0, THRESHOLD);
        assert!(!detector.in_pulse());
    }

    #[test]
    fn timing_survives_clock_wrap() {
        let mut detector = BeatDetector::new(DetectorConfig::default());
        let start = u32::MAX - 399;

        pulse(&mut detector, start);
        let beat = pulse(&mut detector, start.wrapping_add(800));
        assert_eq!(beat.and_then(|b| b.interval), Some(800.ms()));
    }
}
