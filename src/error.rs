use thiserror::Error;

use crate::time::Millis;

/// Rejected configuration values.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The moving average window has no slots
    #[error("sample window must hold at least one sample")]
    EmptyWindow,
    /// A blend, decay or threshold factor lies outside its allowed range
    #[error("{name} must lie in [0, 1], got {value}")]
    FactorOutOfRange { name: &'static str, value: f32 },
    /// The accepted inter-beat interval band contains no value
    #[error("interval band ({min:?}, {max:?}) is empty")]
    EmptyIntervalBand { min: Millis, max: Millis },
    #[error("BPM range [{min}, {max}] is empty or contains zero")]
    InvalidBpmRange { min: u16, max: u16 },
    #[error("base BPM {base} lies outside [{min}, {max}]")]
    BaseBpmOutOfRange { base: u16, min: u16, max: u16 },
    #[error("indicator BPM domain [{low}, {high}] is empty")]
    InvalidIndicatorDomain { low: u16, high: u16 },
    /// The buzzer would still be sounding when the next beat is due
    #[error("buzzer pulse {on:?} is longer than the shortest beat period {period:?}")]
    BuzzerPulseTooLong { on: Millis, period: Millis },
    #[error("{phase} phase must last longer than zero")]
    ZeroDuration { phase: &'static str },
}
