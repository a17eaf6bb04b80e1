//! Helpers for working with millisecond clock readings and durations.
//!
//! Clock readings wrap around at `u32::MAX`. Every elapsed-time computation goes through
//! [`Timestamp::since`], which uses wrapping subtraction and stays correct across the wrap.

/// A reading of the monotonic millisecond clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Timestamp(u32);

/// A span of time in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Millis(u32);

/// Extension functions for numeric types used to create [`Millis`] values.
///
/// # Usage
/// ```rust
/// use pulse_monitor::time::*;
///
/// // Both values represent five seconds
/// let a = 5000.ms();
/// let b = 5.s();
///
/// assert_eq!(a, b);
/// ```
pub trait TimeExt {
    fn ms(self) -> Millis;
    fn s(self) -> Millis;
}

impl TimeExt for u32 {
    fn ms(self) -> Millis {
        Millis(self)
    }

    fn s(self) -> Millis {
        Millis(self.saturating_mul(1000))
    }
}

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// Returns the raw clock reading.
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`.
    /// ```rust
    /// # use pulse_monitor::time::*;
    /// #
    /// let before_wrap = Timestamp::from_millis(u32::MAX - 99);
    /// let after_wrap = Timestamp::from_millis(100);
    /// assert_eq!(after_wrap.since(before_wrap), 200.ms());
    /// ```
    pub fn since(self, earlier: Timestamp) -> Millis {
        Millis(self.0.wrapping_sub(earlier.0))
    }

    pub fn wrapping_add(self, duration: Millis) -> Timestamp {
        Timestamp(self.0.wrapping_add(duration.0))
    }
}

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn as_millis(self) -> u32 {
        self.0
    }

    pub fn saturating_sub(self, other: Millis) -> Millis {
        Millis(self.0.saturating_sub(other.0))
    }

    /// Whole seconds left until `self` elapses, rounded up the way a countdown is shown.
    /// ```rust
    /// # use pulse_monitor::time::*;
    /// #
    /// assert_eq!(5.s().countdown(0.ms()), 6);
    /// assert_eq!(5.s().countdown(4500.ms()), 1);
    /// assert_eq!(5.s().countdown(7.s()), 1);
    /// ```
    pub fn countdown(self, elapsed: Millis) -> u32 {
        self.saturating_sub(elapsed).0 / 1000 + 1
    }
}
