//! Capabilities the monitor needs from the board.
//!
//! Each trait is deliberately narrow so that a board support crate, or a test, only implements
//! what it has.

use crate::time::{Millis, Timestamp};

/// Analog source of raw light readings.
pub trait Sensor {
    /// Takes one sample in the converter's native range, e.g. `0..=1023`.
    fn read_sample(&mut self) -> u16;
}

/// Monotonic millisecond clock.
pub trait Clock {
    fn now(&mut self) -> Timestamp;

    /// Blocks for `duration`. Only used between ticks and during startup.
    fn pause(&mut self, duration: Millis);
}

/// A fixed row of on/off indicators, e.g. an LED bar.
pub trait Indicators {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn set_indicator(&mut self, index: usize, on: bool);
}

/// Tone generator driving the buzzer.
pub trait Tone {
    fn set_tone(&mut self, on: bool, frequency_hz: u32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Row {
    Top,
    Bottom,
}

/// Two-line character display.
pub trait TextDisplay {
    fn write_line(&mut self, row: Row, text: &str);
}

/// Best-effort diagnostic output.
pub trait LogSink {
    fn log_line(&mut self, text: &str);
}

impl LogSink for () {
    fn log_line(&mut self, _text: &str) {}
}

/// Forwards telemetry lines to the [`log`] facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFacade;

impl LogSink for LogFacade {
    fn log_line(&mut self, text: &str) {
        log::debug!(target: "pulse_monitor::telemetry", "{}", text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sinks_accept_lines() {
        ().log_line("Raw: 512");
        LogFacade.log_line("Raw: 512");
    }
}
