//! This crate extracts a heart rate from a slowly drifting optical intensity signal, such as a
//! photoresistor lit through a fingertip, and drives feedback synchronized to it.
//!
//! Every tick runs the same pipeline, in this order:
//! sample → moving average → smoothing → envelope → beat detection → rate estimation →
//! measurement cycle → feedback.
//!
//! [`PulseMonitor`] holds the signal pipeline and is independent of any hardware.
//! [`device::PulseDevice`] wires it to a sensor, clock, indicators, buzzer and display.
#![cfg_attr(not(test), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod actuator;
pub mod algorithms;
pub mod config;
pub mod cycle;
pub mod device;
pub mod display;
pub mod error;
pub mod hal;
mod sliding;
pub mod time;

use algorithms::{
    AdaptiveCalibrator, BeatDetector, BeatEvent, BpmEstimate, BpmEstimator, Envelope,
    FilteredSignal, RingAverager,
};
use config::PulseConfig;
use cycle::{CycleScheduler, CycleState, Transition};
use error::ConfigError;
use time::*;

/// Outcome of one tick of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tick {
    pub raw: u16,
    /// Smoothed signal after this sample.
    pub filtered: f32,
    pub threshold: f32,
    /// Beat accepted during this tick.
    pub beat: Option<BeatEvent>,
    /// Phase change at the end of this tick.
    pub transition: Option<Transition>,
    pub bpm: u16,
}

/// Turns raw samples into beats and a rate estimate.
///
/// # Type parameters:
///
/// - `W` - buffer type holding the moving average window
pub struct PulseMonitor<W>
where
    W: AsRef<[u16]> + AsMut<[u16]>,
{
    config: PulseConfig,
    averager: RingAverager<W>,
    signal: FilteredSignal,
    calibrator: AdaptiveCalibrator,
    detector: BeatDetector,
    estimator: BpmEstimator,
    scheduler: CycleScheduler,
}

impl PulseMonitor<[u16; 0]> {
    /// Creates a monitor averaging the last `N` samples. The window is allocated on the stack as
    /// part of the `PulseMonitor` structure.
    ///
    /// # Example
    /// ```rust
    /// use pulse_monitor::config::PulseConfig;
    /// use pulse_monitor::PulseMonitor;
    ///
    /// let monitor = PulseMonitor::new::<20>(PulseConfig::default()).unwrap();
    /// assert_eq!(monitor.bpm(), 60);
    /// ```
    pub fn new<const N: usize>(config: PulseConfig) -> Result<PulseMonitor<[u16; N]>, ConfigError> {
        PulseMonitor::new_from(config, [0; N])
    }

    /// Creates a monitor with a heap allocated window of `len` samples.
    #[cfg(feature = "alloc")]
    pub fn new_alloc(
        config: PulseConfig,
        len: usize,
    ) -> Result<PulseMonitor<alloc::boxed::Box<[u16]>>, ConfigError> {
        PulseMonitor::new_from(config, alloc::vec![0; len].into_boxed_slice())
    }
}

impl<W> PulseMonitor<W>
where
    W: AsRef<[u16]> + AsMut<[u16]>,
{
    /// Creates a monitor using `window` as the moving average buffer. Its length sets the
    /// window size.
    ///
    /// # Example
    ///
    /// The window may be a borrowed slice:
    ///
    /// ```rust
    /// use pulse_monitor::config::PulseConfig;
    /// use pulse_monitor::PulseMonitor;
    ///
    /// let mut window = [0u16; 10];
    /// let monitor = PulseMonitor::new_from(PulseConfig::default(), &mut window[..]).unwrap();
    /// ```
    pub fn new_from(config: PulseConfig, window: W) -> Result<Self, ConfigError> {
        config.validate()?;
        if window.as_ref().is_empty() {
            return Err(ConfigError::EmptyWindow);
        }

        Ok(Self {
            averager: RingAverager::new(window),
            signal: FilteredSignal::new(config.filter.blend),
            calibrator: AdaptiveCalibrator::new(config.calibration),
            detector: BeatDetector::new(config.detector),
            estimator: BpmEstimator::new(config.estimator),
            scheduler: CycleScheduler::new(config.cycle, Timestamp::ZERO),
            config,
        })
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    pub fn window_len(&self) -> usize {
        self.averager.capacity()
    }

    /// Fills the window with `samples` and settles every stage on their average.
    pub fn prime(&mut self, samples: impl IntoIterator<Item = u16>) {
        self.averager.clear();
        for sample in samples {
            self.averager.push(sample);
        }

        let level = self.averager.average();
        self.signal.prime(level);
        self.calibrator.prime(level);
        self.detector.clear();
        self.estimator.clear();

        log::debug!("primed at level {}", level);
    }

    /// Enters the calibration phase at `now`.
    pub fn start_calibration(&mut self, now: Timestamp) {
        self.scheduler = CycleScheduler::new(self.config.cycle, now);
    }

    /// Runs one sample through the pipeline.
    pub fn process(&mut self, now: Timestamp, sample: u16) -> Tick {
        let average = self.averager.push(sample);
        let filtered = self.signal.update(average);
        self.calibrator.update(filtered);
        let threshold = self.calibrator.envelope().threshold;

        let beat = if self.scheduler.is_measuring() {
            let beat = self
                .detector
                .update(now, filtered, self.signal.derivative(), threshold);
            if let Some(event) = beat {
                self.estimator.on_beat(event.at);
            }
            beat
        } else {
            None
        };

        let transition = self.scheduler.update(now, self.estimator.bpm());
        match transition {
            Some(Transition::CalibrationComplete) => self.calibrator.finish(),
            Some(Transition::NextMeasurement) => self.restart_measurement(),
            Some(Transition::MeasurementComplete { .. }) | None => {}
        }

        Tick {
            raw: sample,
            filtered,
            threshold,
            beat,
            transition,
            bpm: self.estimator.bpm(),
        }
    }

    /// Drops everything the previous measurement collected.
    fn restart_measurement(&mut self) {
        self.estimator.clear();
        self.detector.clear();
        self.averager.clear();
    }

    pub fn bpm(&self) -> u16 {
        self.estimator.bpm()
    }

    pub fn estimate(&self) -> BpmEstimate {
        self.estimator.estimate()
    }

    pub fn envelope(&self) -> Envelope {
        self.calibrator.envelope()
    }

    pub fn filtered(&self) -> f32 {
        self.signal.value()
    }

    pub fn last_beat(&self) -> Option<Timestamp> {
        self.detector.last_beat()
    }

    pub fn beats_recorded(&self) -> usize {
        self.estimator.history().len()
    }

    pub fn state(&self) -> CycleState {
        self.scheduler.state()
    }

    pub fn scheduler(&self) -> &CycleScheduler {
        &self.scheduler
    }
}
