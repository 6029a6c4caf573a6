//! Shared test infrastructure for strip-clock integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use strip_clock::{
    ClockReading, Color, PixelSink, RandomSource, TimeDuration, TimeInstant, TimeSource,
    WallClock,
};
use smart_leds::{RGB8, SmartLedsWrite};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

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

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

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

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: core::cell::Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: core::cell::Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given duration
    pub fn advance(&self, duration: TestDuration) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + duration.0));
    }

    pub fn set_time(&self, time: TestInstant) {
        self.current_time.set(time);
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Pixel Sink
// ============================================================================

/// Error reported by a failing [`RecordingSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkFault;

/// Pixel sink that records every refresh
pub struct RecordingSink {
    writes: usize,
    last_frame: heapless::Vec<Color, 32>,
    failing: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            writes: 0,
            last_frame: heapless::Vec::new(),
            failing: false,
        }
    }

    /// Number of successful refreshes
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn last_frame(&self) -> &[Color] {
        &self.last_frame
    }

    /// Make every following refresh fail (or succeed again)
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl PixelSink for RecordingSink {
    type Error = SinkFault;

    fn write(&mut self, pixels: &[Color]) -> Result<(), Self::Error> {
        if self.failing {
            return Err(SinkFault);
        }
        self.writes += 1;
        self.last_frame = heapless::Vec::from_slice(pixels).map_err(|_| SinkFault)?;
        Ok(())
    }
}

// ============================================================================
// Mock smart-leds Driver
// ============================================================================

/// `smart-leds` driver that records RGB frames
pub struct MockDriver {
    writes: usize,
    last_frame: heapless::Vec<RGB8, 32>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            writes: 0,
            last_frame: heapless::Vec::new(),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn last_frame(&self) -> &[RGB8] {
        &self.last_frame
    }
}

impl SmartLedsWrite for MockDriver {
    type Error = ();
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        self.last_frame = iterator.into_iter().map(Into::into).collect();
        self.writes += 1;
        Ok(())
    }
}

// ============================================================================
// Scripted Random Source
// ============================================================================

/// Random source that replays a fixed list of draws, wrapping at the end
pub struct ScriptedRandom {
    values: heapless::Vec<f32, 32>,
    position: usize,
}

impl ScriptedRandom {
    pub fn new(values: &[f32]) -> Self {
        Self {
            values: heapless::Vec::from_slice(values).unwrap(),
            position: 0,
        }
    }

    /// Always draws the same value
    pub fn constant(value: f32) -> Self {
        Self::new(&[value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_f32(&mut self) -> f32 {
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }

    fn next_index(&mut self, bound: usize) -> usize {
        ((self.next_f32() * bound as f32) as usize).min(bound - 1)
    }
}

// ============================================================================
// Mock Wall Clock
// ============================================================================

/// Error reported by a failing [`FixedClock`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockFault;

/// Wall clock that returns whatever reading it was last set to
pub struct FixedClock {
    pub reading: ClockReading,
    pub failing: bool,
}

impl FixedClock {
    pub fn new(reading: ClockReading) -> Self {
        Self {
            reading,
            failing: false,
        }
    }
}

impl WallClock for FixedClock {
    type Error = ClockFault;

    fn read(&mut self) -> Result<ClockReading, Self::Error> {
        if self.failing {
            Err(ClockFault)
        } else {
            Ok(self.reading)
        }
    }
}

// ============================================================================
// Test Helper Functions
// ============================================================================

/// One second, long enough for every countdown used in the tests to lapse
pub const SECOND: TestDuration = TestDuration(1000);

/// Indices of the pixels showing `color`
pub fn positions_of(pixels: &[Color], color: Color) -> heapless::Vec<usize, 32> {
    pixels
        .iter()
        .enumerate()
        .filter(|(_, pixel)| **pixel == color)
        .map(|(i, _)| i)
        .collect()
}
