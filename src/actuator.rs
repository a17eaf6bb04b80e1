//! Beat-synchronized feedback.
//!
//! The buzzer ticks at the period of the current estimate rather than on detected beats, so a
//! noisy detection does not cut the rhythm short.

use crate::{
    config::ActuatorConfig,
    hal::{Indicators, Tone},
    time::*,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActuatorState {
    pub buzzer_on: bool,
    pub last_toggle: Timestamp,
}

pub struct ActuatorSync {
    state: ActuatorState,
    lit: Option<usize>,
    config: ActuatorConfig,
}

impl ActuatorSync {
    pub fn new(config: ActuatorConfig, now: Timestamp) -> Self {
        Self {
            state: ActuatorState {
                buzzer_on: false,
                last_toggle: now,
            },
            lit: None,
            config,
        }
    }

    pub fn state(&self) -> ActuatorState {
        self.state
    }

    /// Number of indicators to light for `bpm` out of `total`.
    pub fn indicator_count(&self, bpm: u16, total: usize) -> usize {
        let low = u32::from(self.config.indicator_low_bpm);
        let high = u32::from(self.config.indicator_high_bpm);
        let bpm = u32::from(bpm).clamp(low, high);

        (bpm - low) as usize * total / (high - low) as usize
    }

    /// On and off durations of one buzzer tick at `bpm`.
    pub fn buzzer_schedule(&self, bpm: u16) -> (Millis, Millis) {
        let period = (60_000 / u32::from(bpm.max(1))).ms();
        let on = self.config.buzzer_on.min(period);

        (on, period.saturating_sub(on))
    }

    /// Decides the buzzer state for this tick. Returns the new state if it changed.
    pub fn step_buzzer(
        &mut self,
        now: Timestamp,
        bpm: u16,
        last_beat: Option<Timestamp>,
    ) -> Option<bool> {
        let recent = last_beat
            .map(|beat| now.since(beat) < self.config.recent_beat_window)
            .unwrap_or(false);

        if !recent {
            if self.state.buzzer_on {
                self.state.buzzer_on = false;
                return Some(false);
            }
            return None;
        }

        let (on, off) = self.buzzer_schedule(bpm);
        let hold = if self.state.buzzer_on { on } else { off };

        if now.since(self.state.last_toggle) > hold {
            self.state.buzzer_on = !self.state.buzzer_on;
            self.state.last_toggle = now;
            Some(self.state.buzzer_on)
        } else {
            None
        }
    }

    /// Drives indicators and buzzer from the current estimate.
    pub fn update<L, B>(
        &mut self,
        now: Timestamp,
        bpm: u16,
        last_beat: Option<Timestamp>,
        leds: &mut L,
        buzzer: &mut B,
    ) where
        L: Indicators,
        B: Tone,
    {
        let total = leds.len();
        let count = self.indicator_count(bpm, total);
        if self.lit != Some(count) {
            for index in 0..total {
                leds.set_indicator(index, index < count);
            }
            self.lit = Some(count);
        }

        if let Some(on) = self.step_buzzer(now, bpm, last_beat) {
            buzzer.set_tone(on, self.config.buzzer_frequency_hz);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leds([bool; 12]);

    impl Indicators for Leds {
        fn len(&self) -> usize {
            self.0.len()
        }

        fn set_indicator(&mut self, index: usize, on: bool) {
            self.0[index] = on;
        }
    }

    #[derive(Default)]
    struct Buzzer(Vec<(bool, u32)>);

    impl Tone for Buzzer {
        fn set_tone(&mut self, on: bool, frequency_hz: u32) {
            self.0.push((on, frequency_hz));
        }
    }

    fn at(ms: u32) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    #[test]
    fn indicator_count_maps_bpm_range() {
        let actuator = ActuatorSync::new(ActuatorConfig::default(), at(0));

        assert_eq!(actuator.indicator_count(30, 12), 0);
        assert_eq!(actuator.indicator_count(40, 12), 0);
        assert_eq!(actuator.indicator_count(90, 12), 6);
        assert_eq!(actuator.indicator_count(140, 12), 12);
        assert_eq!(actuator.indicator_count(200, 12), 12);
    }

    #[test]
    fn buzzer_schedule_fits_in_beat_period() {
        let actuator = ActuatorSync::new(ActuatorConfig::default(), at(0));

        assert_eq!(actuator.buzzer_schedule(60), (50.ms(), 950.ms()));
        for bpm in 40..=200 {
            let (on, off) = actuator.buzzer_schedule(bpm);
            assert!(on <= (60_000 / u32::from(bpm)).ms());
            assert_eq!(on.as_millis() + off.as_millis(), 60_000 / u32::from(bpm));
        }
    }

    #[test]
    fn buzzer_ticks_once_per_period() {
        let mut actuator = ActuatorSync::new(ActuatorConfig::default(), at(0));
        let beat = Some(at(1000));

        let toggles: Vec<(u32, bool)> = (1000..3000)
            .step_by(10)
            .filter_map(|t| actuator.step_buzzer(at(t), 60, beat).map(|on| (t, on)))
            .collect();

        assert_eq!(
            toggles,
            vec![(1000, true), (1060, false), (2020, true), (2080, false)]
        );
    }

    #[test]
    fn buzzer_silenced_without_recent_beat() {
        let mut actuator = ActuatorSync::new(ActuatorConfig::default(), at(0));
        let mut leds = Leds([false; 12]);
        let mut buzzer = Buzzer::default();

        actuator.update(at(1000), 60, Some(at(1000)), &mut leds, &mut buzzer);
        assert!(actuator.state().buzzer_on);

        actuator.update(at(4000), 60, Some(at(1000)), &mut leds, &mut buzzer);
        assert!(!actuator.state().buzzer_on);
        assert_eq!(buzzer.0, vec![(true, 1000), (false, 1000)]);

        // Nothing more to switch off
        actuator.update(at(4010), 60, Some(at(1000)), &mut leds, &mut buzzer);
        actuator.update(at(4020), 60, None, &mut leds, &mut buzzer);
        assert_eq!(buzzer.0.len(), 2);
    }

    #[test]
    fn lights_indicators_for_rate() {
        let mut actuator = ActuatorSync::new(ActuatorConfig::default(), at(0));
        let mut leds = Leds([true; 12]);
        let mut buzzer = Buzzer::default();

        actuator.update(at(0), 90, None, &mut leds, &mut buzzer);
        assert_eq!(leds.0.iter().filter(|on| **on).count(), 6);
        assert!(leds.0[..6].iter().all(|on| *on));
    }
}
