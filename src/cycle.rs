//! Measurement cycle: Calibrating → Measuring → Waiting → Measuring → …
//!
//! Every transition is a wall-clock timeout. The cycle never ends.

use crate::{config::CycleConfig, time::*};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CycleState {
    Calibrating { since: Timestamp },
    Measuring { since: Timestamp },
    /// Holds the rate measured by the cycle that just ended.
    Waiting { since: Timestamp, bpm: u16 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Calibrating → Measuring
    CalibrationComplete,
    /// Measuring → Waiting, with the rate frozen for display
    MeasurementComplete { bpm: u16 },
    /// Waiting → Measuring
    NextMeasurement,
}

pub struct CycleScheduler {
    state: CycleState,
    config: CycleConfig,
}

impl CycleScheduler {
    /// Starts calibrating at `now`.
    pub fn new(config: CycleConfig, now: Timestamp) -> Self {
        Self {
            state: CycleState::Calibrating { since: now },
            config,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn is_measuring(&self) -> bool {
        matches!(self.state, CycleState::Measuring { .. })
    }

    fn since(&self) -> Timestamp {
        match self.state {
            CycleState::Calibrating { since }
            | CycleState::Measuring { since }
            | CycleState::Waiting { since, .. } => since,
        }
    }

    /// Length of the current phase.
    pub fn phase_duration(&self) -> Millis {
        match self.state {
            CycleState::Calibrating { .. } => self.config.calibration,
            CycleState::Measuring { .. } => self.config.measuring,
            CycleState::Waiting { .. } => self.config.waiting,
        }
    }

    pub fn elapsed(&self, now: Timestamp) -> Millis {
        now.since(self.since())
    }

    /// Advances the cycle. `bpm` is the current estimate, frozen if measuring ends now.
    pub fn update(&mut self, now: Timestamp, bpm: u16) -> Option<Transition> {
        if self.elapsed(now) <= self.phase_duration() {
            return None;
        }

        let (state, transition) = match self.state {
            CycleState::Calibrating { .. } => (
                CycleState::Measuring { since: now },
                Transition::CalibrationComplete,
            ),
            CycleState::Measuring { .. } => (
                CycleState::Waiting { since: now, bpm },
                Transition::MeasurementComplete { bpm },
            ),
            CycleState::Waiting { .. } => (
                CycleState::Measuring { since: now },
                Transition::NextMeasurement,
            ),
        };

        log::info!("{:?}", transition);
        self.state = state;
        Some(transition)
    }
}
