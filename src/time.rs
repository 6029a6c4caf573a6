//! Time abstraction traits for platform-agnostic timing.
//!
//! Monotonic time (used to pace ticks) is kept separate from wall-clock time
//! (used to pick what the strips show), see [`crate::clock`].

/// Trait for abstracting monotonic time sources.
pub trait TimeSource<I: TimeInstant> {
    /// Returns the current time instant.
    fn now(&self) -> I;
}

/// Trait abstraction for duration types.
pub trait TimeDuration: Copy + PartialEq {
    /// Zero duration constant.
    const ZERO: Self;

    /// Converts duration to milliseconds.
    fn as_millis(&self) -> u64;

    /// Creates duration from milliseconds.
    fn from_millis(millis: u64) -> Self;

    /// Saturating subtraction (returns ZERO on underflow).
    fn saturating_sub(self, other: Self) -> Self;

    /// Converts duration to fractional seconds.
    #[allow(clippy::cast_precision_loss)]
    fn as_secs_f32(&self) -> f32 {
        self.as_millis() as f32 / 1000.0
    }
}

/// Trait abstraction for instant types.
pub trait TimeInstant: Copy {
    /// Duration type for this instant.
    type Duration: TimeDuration;

    /// Calculates duration since an earlier instant.
    fn duration_since(&self, earlier: Self) -> Self::Duration;

    /// Adds duration to instant, returns None on overflow.
    fn checked_add(self, duration: Self::Duration) -> Option<Self>;

    /// Subtracts duration from instant, returns None on underflow.
    fn checked_sub(self, duration: Self::Duration) -> Option<Self>;
}

#[cfg(feature = "std")]
mod std_impl {
    use super::{TimeDuration, TimeInstant, TimeSource};
    use std::time::{Duration, Instant};

    impl TimeDuration for Duration {
        const ZERO: Self = Duration::ZERO;

        fn as_millis(&self) -> u64 {
            u64::try_from(Duration::as_millis(self)).unwrap_or(u64::MAX)
        }

        fn from_millis(millis: u64) -> Self {
            Duration::from_millis(millis)
        }

        fn saturating_sub(self, other: Self) -> Self {
            Duration::saturating_sub(self, other)
        }

        fn as_secs_f32(&self) -> f32 {
            Duration::as_secs_f32(self)
        }
    }

    impl TimeInstant for Instant {
        type Duration = Duration;

        fn duration_since(&self, earlier: Self) -> Duration {
            self.saturating_duration_since(earlier)
        }

        fn checked_add(self, duration: Duration) -> Option<Self> {
            Instant::checked_add(&self, duration)
        }

        fn checked_sub(self, duration: Duration) -> Option<Self> {
            Instant::checked_sub(&self, duration)
        }
    }

    /// Monotonic time source backed by [`std::time::Instant`].
    #[derive(Debug, Default, Clone, Copy)]
    pub struct StdTimeSource;

    impl TimeSource<Instant> for StdTimeSource {
        fn now(&self) -> Instant {
            Instant::now()
        }
    }
}

#[cfg(feature = "std")]
pub use std_impl::StdTimeSource;
