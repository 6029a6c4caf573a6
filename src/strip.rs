//! LED strip state and the tick engine.
//!
//! Provides [`Strip`], which owns one physical strip's pixel buffer and
//! per-pixel hold countdowns, and commits frames to the hardware through the
//! [`PixelSink`] trait. The animators ([`Strip::cycle_between`] and
//! [`Strip::chase`]) build frames and feed them to [`Strip::tick`].

use crate::color::{Channels, Color, OFF};
use crate::cycle::ColorCycle;
use crate::sink::MapErr;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use crate::types::{ColorDuration, ConfigError, FadeTiming};
use heapless::Vec;

/// Hold time every pixel starts with, in seconds.
pub const INITIAL_COUNTDOWN: f32 = 1.0;

/// Default time for a full-strip fade, in seconds.
pub const DEFAULT_FADE_SECS: f32 = 0.5;

/// Trait for abstracting LED strip hardware.
///
/// Implement this for your LED driver (SPI, RMT, PIO, bit-banged, etc.). The
/// strip keeps its pixels in memory and only calls [`PixelSink::write`] when
/// something changed.
pub trait PixelSink {
    /// Error reported by the driver.
    type Error;

    /// Pushes the whole pixel buffer to the hardware.
    fn write(&mut self, pixels: &[Color]) -> Result<(), Self::Error>;

    /// Wraps the sink so that its errors are converted with `f`.
    ///
    /// Strips on different drivers can then share one error type, and with it
    /// one [`DynSink`](crate::sink::DynSink) type inside an orchestrator.
    fn map_err<E, F>(self, f: F) -> MapErr<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Error) -> E,
    {
        MapErr::new(self, f)
    }
}

/// Static description of a strip.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripConfig {
    /// Name used in log output.
    pub name: &'static str,

    /// Number of pixels on the strip.
    pub pixel_count: usize,

    /// Channels the pixels have.
    pub channels: Channels,

    /// Time for a default crossfade to sweep the whole strip, in seconds.
    pub fade_duration: f32,
}

impl StripConfig {
    /// Creates an RGB strip configuration with the default fade duration.
    pub const fn new(name: &'static str, pixel_count: usize) -> Self {
        Self {
            name,
            pixel_count,
            channels: Channels::Rgb,
            fade_duration: DEFAULT_FADE_SECS,
        }
    }

    pub const fn with_channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }

    pub const fn with_fade_duration(mut self, fade_duration: f32) -> Self {
        self.fade_duration = fade_duration;
        self
    }
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Number of pixels whose color changed.
    pub changed: usize,

    /// Whether the hardware was refreshed.
    pub refreshed: bool,

    /// Whether the whole strip settled on one color and the cycle moved on.
    pub cycle_advanced: bool,
}

/// Errors that can occur while ticking a strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StripError<E> {
    /// The frame does not have exactly one entry per pixel.
    FrameLength { expected: usize, actual: usize },

    /// The hardware refresh failed. It will be retried on the next tick.
    Refresh(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for StripError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StripError::FrameLength { expected, actual } => {
                write!(
                    f,
                    "frame has {} entries, strip has {} pixels",
                    actual, expected
                )
            }
            StripError::Refresh(err) => write!(f, "pixel refresh failed: {:?}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for StripError<E> {}

/// Mutable per-strip animation state.
///
/// `pixels` and `countdowns` always have exactly `pixel_count` entries.
#[derive(Debug, Clone)]
pub struct StripState<I, const N: usize> {
    pixels: Vec<Color, N>,
    countdowns: Vec<f32, N>,
    last_tick: I,
    cycle_index: usize,
    cycle: Option<ColorCycle>,
    channels: Channels,
    timing: FadeTiming,
}

impl<I: TimeInstant, const N: usize> StripState<I, N> {
    /// Creates a dark strip state.
    ///
    /// # Errors
    /// * `ZeroPixels` - `pixel_count` is zero
    /// * `PixelCountExceedsCapacity` - `pixel_count` is larger than `N`
    pub fn new(config: &StripConfig, now: I) -> Result<Self, ConfigError> {
        if config.pixel_count == 0 {
            return Err(ConfigError::ZeroPixels);
        }
        if config.pixel_count > N {
            return Err(ConfigError::PixelCountExceedsCapacity {
                requested: config.pixel_count,
                capacity: N,
            });
        }

        let pixels = (0..config.pixel_count).map(|_| OFF).collect();
        let countdowns = (0..config.pixel_count).map(|_| INITIAL_COUNTDOWN).collect();

        Ok(Self {
            pixels,
            countdowns,
            last_tick: now,
            cycle_index: 0,
            cycle: None,
            channels: config.channels,
            timing: FadeTiming::from_fade(config.fade_duration, config.pixel_count),
        })
    }

    /// Commits one frame after `elapsed` seconds.
    ///
    /// Every pixel's countdown drops by `elapsed`. A pixel whose countdown
    /// lapses takes the frame's color and hold time. When the strip changed and
    /// every lapsed pixel took the same color, the crossfade cycle has completed
    /// a step and the cycle index moves on.
    ///
    /// Only pixels with a frame entry are considered; [`Strip::tick`] rejects
    /// frames of the wrong length before calling this.
    pub(crate) fn apply(&mut self, frame: &[ColorDuration], elapsed: f32) -> TickReport {
        let channels = self.channels;
        let mut report = TickReport::default();
        let mut settled: Option<Color> = None;
        let mut mixed = false;

        for ((pixel, countdown), next) in self
            .pixels
            .iter_mut()
            .zip(self.countdowns.iter_mut())
            .zip(frame.iter().copied())
        {
            *countdown -= elapsed;
            if *countdown > 0.0 {
                continue;
            }

            *countdown = next.duration;

            match settled {
                None => settled = Some(next.color),
                Some(color) if !color.matches(next.color, channels) => mixed = true,
                Some(_) => {}
            }

            if !pixel.matches(next.color, channels) {
                *pixel = next.color;
                report.changed += 1;
            }
        }

        if report.changed > 0 && !mixed {
            let len = self.cycle.as_ref().map_or(1, |cycle| cycle.len().max(1));
            self.cycle_index = (self.cycle_index + 1) % len;
            report.cycle_advanced = true;
        }

        report
    }

    /// Sets every pixel to off, returning how many changed.
    pub fn clear(&mut self) -> usize {
        let channels = self.channels;
        let mut changed = 0;
        for pixel in &mut self.pixels {
            if !pixel.matches(OFF, channels) {
                *pixel = OFF;
                changed += 1;
            }
        }
        changed
    }

    /// Counts pixels showing `color` on this strip's channels.
    pub fn count_matching(&self, color: Color) -> usize {
        self.pixels
            .iter()
            .filter(|pixel| pixel.matches(color, self.channels))
            .count()
    }

    /// Replaces the cached crossfade cycle if it differs from `cycle`.
    pub(crate) fn remember_cycle(&mut self, cycle: &ColorCycle) {
        if self.cycle.as_ref() != Some(cycle) {
            self.cycle = Some(cycle.clone());
        }
    }

    pub(crate) fn set_cycle_index(&mut self, index: usize) {
        self.cycle_index = index;
    }

    pub(crate) fn set_last_tick(&mut self, now: I) {
        self.last_tick = now;
    }

    /// Returns the number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Returns the buffered pixel colors.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Returns the remaining hold time of each pixel, in seconds.
    pub fn countdowns(&self) -> &[f32] {
        &self.countdowns
    }

    /// Returns the instant of the last tick.
    pub fn last_tick(&self) -> I {
        self.last_tick
    }

    /// Returns the position within the current crossfade cycle.
    pub fn cycle_index(&self) -> usize {
        self.cycle_index
    }

    /// Returns the crossfade cycle last used on this strip.
    pub fn cycle(&self) -> Option<&ColorCycle> {
        self.cycle.as_ref()
    }

    /// Returns the channels of the strip's pixels.
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Returns the crossfade pacing configured for this strip.
    pub fn default_timing(&self) -> FadeTiming {
        self.timing
    }
}

/// One LED strip: its state, its hardware and its clock.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `P` - Pixel sink implementation type
/// * `T` - Time source implementation type
/// * `N` - Maximum number of pixels on the strip
pub struct Strip<'t, I: TimeInstant, P: PixelSink, T: TimeSource<I>, const N: usize> {
    name: &'static str,
    sink: P,
    time_source: &'t T,
    state: StripState<I, N>,
    refresh_pending: bool,
}

impl<'t, I: TimeInstant, P: PixelSink, T: TimeSource<I>, const N: usize> Strip<'t, I, P, T, N> {
    /// Creates a strip with every pixel off. The hardware is not touched
    /// until the first tick or [`Strip::turn_off`].
    ///
    /// # Errors
    /// Returns a configuration error if the pixel count is zero or does not
    /// fit in `N`.
    pub fn new(config: &StripConfig, sink: P, time_source: &'t T) -> Result<Self, ConfigError> {
        let state = StripState::new(config, time_source.now())?;
        Ok(Self {
            name: config.name,
            sink,
            time_source,
            state,
            refresh_pending: false,
        })
    }

    /// Advances the strip by one frame.
    ///
    /// `frame` holds the next color and hold time of every pixel. The hardware
    /// is refreshed only if a pixel changed, or if the previous refresh failed.
    ///
    /// # Errors
    /// * `FrameLength` - `frame` does not have one entry per pixel; nothing is applied
    /// * `Refresh` - The sink failed; the refresh is retried on the next tick
    pub fn tick(&mut self, frame: &[ColorDuration]) -> Result<TickReport, StripError<P::Error>> {
        let expected = self.state.pixel_count();
        if frame.len() != expected {
            return Err(StripError::FrameLength {
                expected,
                actual: frame.len(),
            });
        }

        let now = self.time_source.now();
        let elapsed = now.duration_since(self.state.last_tick()).as_secs_f32();
        let mut report = self.state.apply(frame, elapsed);
        self.state.set_last_tick(now);

        if report.changed > 0 || self.refresh_pending {
            self.refresh()?;
            report.refreshed = true;
        }

        Ok(report)
    }

    /// Turns every pixel off, refreshing only if something was lit.
    ///
    /// # Errors
    /// * `Refresh` - The sink failed; the refresh is retried on the next call
    pub fn turn_off(&mut self) -> Result<TickReport, StripError<P::Error>> {
        let changed = self.state.clear();
        let mut report = TickReport {
            changed,
            ..TickReport::default()
        };

        if changed > 0 || self.refresh_pending {
            self.refresh()?;
            report.refreshed = true;
        }

        Ok(report)
    }

    fn refresh(&mut self) -> Result<(), StripError<P::Error>> {
        match self.sink.write(self.state.pixels()) {
            Ok(()) => {
                self.refresh_pending = false;
                Ok(())
            }
            Err(err) => {
                warn!("refresh of strip {} failed", self.name);
                self.refresh_pending = true;
                Err(StripError::Refresh(err))
            }
        }
    }

    pub(crate) fn state_mut(&mut self) -> &mut StripState<I, N> {
        &mut self.state
    }

    /// Returns the strip's animation state.
    pub fn state(&self) -> &StripState<I, N> {
        &self.state
    }

    /// Returns the strip's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns true if a failed refresh is waiting to be retried.
    pub fn is_refresh_pending(&self) -> bool {
        self.refresh_pending
    }

    /// Returns a reference to the pixel sink.
    pub fn sink(&self) -> &P {
        &self.sink
    }

    /// Returns a mutable reference to the pixel sink.
    pub fn sink_mut(&mut self) -> &mut P {
        &mut self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, RED, WHITE};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestDuration(u64);

    impl TimeDuration for TestDuration {
        const ZERO: Self = TestDuration(0);

        fn as_millis(&self) -> u64 {
            self.0
        }

        fn from_millis(millis: u64) -> Self {
            TestDuration(millis)
        }

        fn saturating_sub(self, other: Self) -> Self {
            TestDuration(self.0.saturating_sub(other.0))
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct TestInstant(u64);

    impl TimeInstant for TestInstant {
        type Duration = TestDuration;

        fn duration_since(&self, earlier: Self) -> Self::Duration {
            TestDuration(self.0 - earlier.0)
        }

        fn checked_add(self, duration: Self::Duration) -> Option<Self> {
            Some(TestInstant(self.0 + duration.0))
        }

        fn checked_sub(self, duration: Self::Duration) -> Option<Self> {
            self.0.checked_sub(duration.0).map(TestInstant)
        }
    }

    fn state(pixels: usize, channels: Channels) -> StripState<TestInstant, 16> {
        let config = StripConfig::new("test", pixels).with_channels(channels);
        StripState::new(&config, TestInstant(0)).unwrap()
    }

    fn uniform(color: Color, duration: f32, n: usize) -> Vec<ColorDuration, 16> {
        (0..n).map(|_| ColorDuration::new(color, duration)).collect()
    }

    #[test]
    fn new_state_is_dark_with_unit_countdowns() {
        let s = state(8, Channels::Rgb);
        assert_eq!(s.pixel_count(), 8);
        assert!(s.pixels().iter().all(|p| *p == OFF));
        assert!(s.countdowns().iter().all(|c| *c == INITIAL_COUNTDOWN));
    }

    #[test]
    fn new_state_rejects_bad_pixel_counts() {
        let zero = StripState::<TestInstant, 16>::new(&StripConfig::new("z", 0), TestInstant(0));
        assert_eq!(zero.unwrap_err(), ConfigError::ZeroPixels);

        let big = StripState::<TestInstant, 16>::new(&StripConfig::new("b", 17), TestInstant(0));
        assert_eq!(
            big.unwrap_err(),
            ConfigError::PixelCountExceedsCapacity {
                requested: 17,
                capacity: 16
            }
        );
    }

    #[test]
    fn apply_waits_for_countdown() {
        let mut s = state(4, Channels::Rgb);
        let report = s.apply(&uniform(RED, 0.5, 4), 0.4);
        assert_eq!(report, TickReport::default());
        assert!(s.pixels().iter().all(|p| *p == OFF));
        assert!(s.countdowns().iter().all(|c| (*c - 0.6).abs() < 1e-6));
    }

    #[test]
    fn apply_commits_lapsed_pixels_and_resets_countdown() {
        let mut s = state(4, Channels::Rgb);
        let report = s.apply(&uniform(RED, 0.5, 4), 1.0);
        assert_eq!(report.changed, 4);
        assert!(report.cycle_advanced);
        assert!(s.pixels().iter().all(|p| *p == RED));
        assert!(s.countdowns().iter().all(|c| *c == 0.5));
    }

    #[test]
    fn mixed_colors_do_not_advance_cycle() {
        let mut s = state(4, Channels::Rgb);
        let mut frame = uniform(RED, 0.5, 4);
        frame[0] = ColorDuration::new(BLUE, 0.5);
        let report = s.apply(&frame, 1.0);
        assert_eq!(report.changed, 4);
        assert!(!report.cycle_advanced);
        assert_eq!(s.cycle_index(), 0);
    }

    #[test]
    fn short_frame_leaves_remaining_pixels_alone() {
        let mut s = state(4, Channels::Rgb);
        let report = s.apply(&uniform(RED, 0.5, 2), 1.0);
        assert_eq!(report.changed, 2);
        assert_eq!(s.pixels(), &[RED, RED, OFF, OFF]);
        assert_eq!(s.countdowns(), &[0.5, 0.5, INITIAL_COUNTDOWN, INITIAL_COUNTDOWN]);
    }

    #[test]
    fn white_channel_is_ignored_on_rgb_strip() {
        let mut s = state(4, Channels::Rgb);
        let report = s.apply(&uniform(WHITE, 0.5, 4), 1.0);
        assert_eq!(report.changed, 0);

        let mut s = state(4, Channels::Rgbw);
        let report = s.apply(&uniform(WHITE, 0.5, 4), 1.0);
        assert_eq!(report.changed, 4);
    }

    #[test]
    fn default_timing_follows_fade_duration() {
        let config = StripConfig::new("t", 8).with_fade_duration(0.8);
        let s = StripState::<TestInstant, 16>::new(&config, TestInstant(0)).unwrap();
        assert!((s.default_timing().step - 0.1).abs() < 1e-6);
        assert!((s.default_timing().pause - 1.6).abs() < 1e-6);
    }
}
