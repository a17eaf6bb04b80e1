mod averager;
mod calibrator;
mod detector;
mod estimator;

pub use averager::{FilteredSignal, RingAverager};
pub use calibrator::{AdaptiveCalibrator, Envelope};
pub use detector::{BeatDetector, BeatEvent};
pub use estimator::{BeatHistory, BpmEstimate, BpmEstimator, HISTORY_LEN};
