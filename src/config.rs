//! Tuning parameters.
//!
//! The defaults are empirical values for a photoresistor sampled every 10 ms. None of them has a
//! derivation behind it, so each one is exposed here rather than baked into the algorithms.

use crate::{error::ConfigError, time::*};

/// Exclusive bounds on a physiologically plausible inter-beat interval.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntervalBand {
    pub min: Millis,
    pub max: Millis,
}

impl IntervalBand {
    pub fn contains(&self, interval: Millis) -> bool {
        self.min < interval && interval < self.max
    }
}

impl Default for IntervalBand {
    fn default() -> Self {
        // 30 to 180 beats per minute
        Self {
            min: 333.ms(),
            max: 2000.ms(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterConfig {
    /// Weight of the newest window average in the smoothed signal.
    pub blend: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { blend: 0.3 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CalibrationConfig {
    /// Per-tick creep of peak and valley towards the signal after calibration.
    pub decay: f32,
    /// Threshold position within the envelope while tracking.
    pub tracking_fraction: f32,
    /// Threshold position within the envelope right after calibration.
    pub calibration_fraction: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            decay: 0.001,
            tracking_fraction: 0.3,
            calibration_fraction: 0.25,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorConfig {
    /// Minimum time after an accepted beat before another rising edge is considered.
    pub debounce: Millis,
    pub band: IntervalBand,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            debounce: 500.ms(),
            band: IntervalBand::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EstimatorConfig {
    /// Reported when no usable interval exists, and the anchor of the exponential blend.
    pub base_bpm: u16,
    /// Weight of the measured rate in the reported value.
    pub alpha: f32,
    pub min_bpm: u16,
    pub max_bpm: u16,
    pub band: IntervalBand,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            base_bpm: 60,
            alpha: 0.2,
            min_bpm: 40,
            max_bpm: 200,
            band: IntervalBand::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CycleConfig {
    pub calibration: Millis,
    pub measuring: Millis,
    pub waiting: Millis,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            calibration: 5.s(),
            measuring: 5.s(),
            waiting: 3.s(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActuatorConfig {
    /// BPM lighting no indicator.
    pub indicator_low_bpm: u16,
    /// BPM lighting every indicator.
    pub indicator_high_bpm: u16,
    pub buzzer_on: Millis,
    pub buzzer_frequency_hz: u32,
    /// The buzzer only ticks while the last detected beat is younger than this.
    pub recent_beat_window: Millis,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            indicator_low_bpm: 40,
            indicator_high_bpm: 140,
            buzzer_on: 50.ms(),
            buzzer_frequency_hz: 1000,
            recent_beat_window: 3.s(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StartupConfig {
    pub chirp: Millis,
    pub warmup_samples: u32,
    pub warmup_pause: Millis,
    pub prime_pause: Millis,
    /// Rate limiter between two ticks of the main loop.
    pub tick_pause: Millis,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            chirp: 200.ms(),
            warmup_samples: 100,
            warmup_pause: 5.ms(),
            prime_pause: 10.ms(),
            tick_pause: 10.ms(),
        }
    }
}

/// Complete set of tuning parameters.
///
/// # Example
/// ```rust
/// use pulse_monitor::config::PulseConfig;
/// use pulse_monitor::time::*;
///
/// let mut config = PulseConfig::default();
/// config.detector.debounce = 400.ms();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PulseConfig {
    pub filter: FilterConfig,
    pub calibration: CalibrationConfig,
    pub detector: DetectorConfig,
    pub estimator: EstimatorConfig,
    pub cycle: CycleConfig,
    pub actuator: ActuatorConfig,
    pub startup: StartupConfig,
}

fn check_factor(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::FactorOutOfRange { name, value })
    }
}

fn check_band(band: IntervalBand) -> Result<(), ConfigError> {
    // Both bounds are exclusive, so at least one whole millisecond must fit between them
    if band.max.as_millis() > band.min.as_millis().saturating_add(1) {
        Ok(())
    } else {
        Err(ConfigError::EmptyIntervalBand {
            min: band.min,
            max: band.max,
        })
    }
}

fn check_duration(phase: &'static str, duration: Millis) -> Result<(), ConfigError> {
    if duration > Millis::ZERO {
        Ok(())
    } else {
        Err(ConfigError::ZeroDuration { phase })
    }
}

impl PulseConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_factor("filter blend", self.filter.blend)?;
        if self.filter.blend == 0.0 {
            // The filtered signal would never move
            return Err(ConfigError::FactorOutOfRange {
                name: "filter blend",
                value: 0.0,
            });
        }
        check_factor("envelope decay", self.calibration.decay)?;
        check_factor("tracking threshold", self.calibration.tracking_fraction)?;
        check_factor("calibration threshold", self.calibration.calibration_fraction)?;
        check_factor("BPM smoothing", self.estimator.alpha)?;

        check_band(self.detector.band)?;
        check_band(self.estimator.band)?;

        let estimator = &self.estimator;
        if estimator.min_bpm == 0 || estimator.min_bpm > estimator.max_bpm {
            return Err(ConfigError::InvalidBpmRange {
                min: estimator.min_bpm,
                max: estimator.max_bpm,
            });
        }
        if !(estimator.min_bpm..=estimator.max_bpm).contains(&estimator.base_bpm) {
            return Err(ConfigError::BaseBpmOutOfRange {
                base: estimator.base_bpm,
                min: estimator.min_bpm,
                max: estimator.max_bpm,
            });
        }

        let actuator = &self.actuator;
        if actuator.indicator_low_bpm >= actuator.indicator_high_bpm {
            return Err(ConfigError::InvalidIndicatorDomain {
                low: actuator.indicator_low_bpm,
                high: actuator.indicator_high_bpm,
            });
        }
        let shortest_period = (60_000 / u32::from(estimator.max_bpm)).ms();
        if actuator.buzzer_on > shortest_period {
            return Err(ConfigError::BuzzerPulseTooLong {
                on: actuator.buzzer_on,
                period: shortest_period,
            });
        }

        check_duration("calibration", self.cycle.calibration)?;
        check_duration("measuring", self.cycle.measuring)?;
        check_duration("waiting", self.cycle.waiting)?;

        Ok(())
    }
}
