//! Text shown on the 16x2 display, and the per-tick telemetry line.

use core::fmt::{self, Write};

use heapless::String;

use crate::{
    cycle::CycleState,
    hal::{Row, TextDisplay},
    time::*,
};

pub const COLUMNS: usize = 16;

/// One display row, padded to the full width.
pub type Line = String<COLUMNS>;

/// Formats `args` into exactly [`COLUMNS`] characters, truncating or padding with spaces.
pub fn line(args: fmt::Arguments) -> Line {
    let mut wide: String<64> = String::new();
    // Overlong output is cut off below anyway
    let _ = wide.write_fmt(args);

    let mut fitted = Line::new();
    for c in wide.chars().chain(core::iter::repeat(' ')) {
        if fitted.push(c).is_err() {
            break;
        }
    }
    fitted
}

#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub top: Line,
    pub bottom: Line,
}

impl Frame {
    pub fn startup() -> Self {
        Self {
            top: line(format_args!("Pulse Sensor")),
            bottom: line(format_args!("Calibrating...")),
        }
    }

    /// What to show in `state`, `elapsed` into a phase lasting `duration`.
    pub fn for_state(state: CycleState, elapsed: Millis, duration: Millis, bpm: u16) -> Self {
        let remaining = duration.countdown(elapsed);
        match state {
            CycleState::Calibrating { .. } => Self::startup(),
            CycleState::Measuring { .. } => Self {
                top: line(format_args!("Measuring: {}s", remaining)),
                bottom: line(format_args!("BPM: {}", bpm)),
            },
            CycleState::Waiting { bpm, .. } => Self {
                top: line(format_args!("Pulse: {} bpm", bpm)),
                bottom: line(format_args!("Next in {}s", remaining)),
            },
        }
    }
}

/// Remembers what the display shows and only rewrites rows that change.
#[derive(Default)]
pub struct Screen {
    shown: Option<Frame>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.shown.as_ref()
    }

    pub fn show<D: TextDisplay>(&mut self, display: &mut D, frame: Frame) {
        let (top_changed, bottom_changed) = match &self.shown {
            Some(shown) => (shown.top != frame.top, shown.bottom != frame.bottom),
            None => (true, true),
        };

        if top_changed {
            display.write_line(Row::Top, &frame.top);
        }
        if bottom_changed {
            display.write_line(Row::Bottom, &frame.bottom);
        }

        self.shown = Some(frame);
    }
}

pub type TelemetryLine = String<96>;

/// `Raw: <raw>\tFiltered: <f>\tThreshold: <t>\tBPM: <bpm>`
pub fn telemetry(raw: u16, filtered: f32, threshold: f32, bpm: u16) -> TelemetryLine {
    let mut text = TelemetryLine::new();
    let _ = write!(
        text,
        "Raw: {}\tFiltered: {:.0}\tThreshold: {:.0}\tBPM: {}",
        raw, filtered, threshold, bpm
    );
    text
}
