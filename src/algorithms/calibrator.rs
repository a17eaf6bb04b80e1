use crate::config::CalibrationConfig;

/// Adaptive detection band around the filtered signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Envelope {
    pub baseline: f32,
    pub peak: f32,
    pub valley: f32,
    pub threshold: f32,
}

impl Envelope {
    fn flat(level: f32) -> Self {
        Self {
            baseline: level,
            peak: level,
            valley: level,
            threshold: level,
        }
    }

    fn spread(&self) -> f32 {
        self.peak - self.valley
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Mode {
    /// Collecting the extremes of the signal
    Calibrating,
    /// Following slow drift of the signal
    Tracking,
}

pub struct AdaptiveCalibrator {
    mode: Mode,
    envelope: Envelope,
    config: CalibrationConfig,
}

impl AdaptiveCalibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            mode: Mode::Calibrating,
            envelope: Envelope::flat(0.0),
            config,
        }
    }

    /// Restarts calibration with a collapsed envelope at `level`.
    pub fn prime(&mut self, level: f32) {
        self.mode = Mode::Calibrating;
        self.envelope = Envelope::flat(level);
    }

    pub fn envelope(&self) -> Envelope {
        self.envelope
    }

    pub fn is_calibrating(&self) -> bool {
        self.mode == Mode::Calibrating
    }

    pub fn update(&mut self, filtered: f32) {
        let env = &mut self.envelope;
        env.peak = env.peak.max(filtered);
        env.valley = env.valley.min(filtered);

        if self.mode == Mode::Tracking {
            // Creep towards the signal. The spread shrinks by (1 - decay) each tick, so the
            // valley never overtakes the peak.
            let decay = self.config.decay;
            env.valley += (filtered - env.valley) * decay;
            env.peak -= (env.peak - filtered) * decay;
            env.threshold = env.valley + env.spread() * self.config.tracking_fraction;
        }
    }

    /// Derives baseline and threshold from the collected extremes and switches to tracking.
    ///
    /// A flat calibration leaves the threshold on the baseline, where the detector cannot fire
    /// until the envelope develops some spread.
    pub fn finish(&mut self) {
        let env = &mut self.envelope;
        env.baseline = (env.peak + env.valley) / 2.0;
        env.threshold = env.valley + env.spread() * self.config.calibration_fraction;
        self.mode = Mode::Tracking;

        log::debug!(
            "calibrated: valley {} peak {} threshold {}",
            env.valley,
            env.peak,
            env.threshold
        );
    }
}
