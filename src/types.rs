//! Core types shared by the resolver, the strips and the orchestrator.

use crate::color::{Color, OFF};

/// The color a pixel commits to next, and how long it holds it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorDuration {
    /// Target color.
    pub color: Color,

    /// Hold time in seconds.
    pub duration: f32,
}

impl ColorDuration {
    /// Creates a new color/duration pair.
    #[inline]
    pub const fn new(color: Color, duration: f32) -> Self {
        Self { color, duration }
    }
}

/// One window of the day: from `start` until the next period's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HourPeriod {
    /// First hour of the window, 0-23.
    pub start: u8,

    /// Background color for the window.
    pub color: Color,

    /// Accent color for the window.
    pub secondary: Color,
}

impl HourPeriod {
    /// Creates a period starting at `start`.
    #[inline]
    pub const fn new(start: u8, color: Color, secondary: Color) -> Self {
        Self {
            start,
            color,
            secondary,
        }
    }

    /// Returns true if the period lights nothing.
    pub fn is_dark(&self) -> bool {
        self.color == OFF && self.secondary == OFF
    }
}

/// Pacing of a crossfade.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FadeTiming {
    /// Hold time of each partial step, in seconds.
    pub step: f32,

    /// Hold time once the strip is fully converted, in seconds.
    pub pause: f32,
}

impl FadeTiming {
    /// Creates a pacing from explicit step and pause hold times, in seconds.
    #[inline]
    pub const fn new(step: f32, pause: f32) -> Self {
        Self { step, pause }
    }

    /// Derives the default pacing from a full-strip fade duration.
    ///
    /// Each of the `pixel_count` steps gets an equal share of the fade and the
    /// pause lasts twice the fade.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_fade(fade_duration: f32, pixel_count: usize) -> Self {
        let pixels = pixel_count.max(1) as f32;
        Self {
            step: fade_duration / pixels,
            pause: fade_duration * 2.0,
        }
    }
}

/// Shape and motion of a chase.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChaseParams {
    /// Hold time of each frame, in seconds.
    pub duration: f32,

    /// Share of the strip covered by the secondary color, 0.0-1.0.
    pub fill: f32,

    /// Probability of moving counter-clockwise on a given call.
    pub randomness: f32,

    /// Pixels moved per call.
    pub movement: usize,

    /// Number of arcs the band is split into when it is (re)seeded.
    pub sections: usize,
}

impl ChaseParams {
    /// Creates chase parameters with the default randomness, movement and sections.
    pub const fn new(duration: f32, fill: f32) -> Self {
        Self {
            duration,
            fill,
            randomness: 0.5,
            movement: 1,
            sections: 2,
        }
    }

    /// Sets the probability of moving counter-clockwise.
    pub const fn with_randomness(mut self, randomness: f32) -> Self {
        self.randomness = randomness;
        self
    }

    /// Sets how many pixels the band moves per call.
    pub const fn with_movement(mut self, movement: usize) -> Self {
        self.movement = movement;
        self
    }

    /// Sets how many arcs a freshly seeded band is split into.
    pub const fn with_sections(mut self, sections: usize) -> Self {
        self.sections = sections;
        self
    }
}

/// Configuration errors, detected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No hour periods provided.
    EmptyPeriodTable,

    /// A period starts at an hour outside 0-23.
    HourOutOfRange { hour: u8 },

    /// Period start hours are not strictly increasing.
    NonIncreasingPeriods { index: usize },

    /// A strip must have at least one pixel.
    ZeroPixels,

    /// The configured pixel count does not fit the strip's buffer.
    PixelCountExceedsCapacity { requested: usize, capacity: usize },

    /// A color cycle needs at least one color.
    EmptyColorCycle,

    /// Fixed capacity exceeded.
    CapacityExceeded,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::EmptyPeriodTable => {
                write!(f, "period table must have at least one period")
            }
            ConfigError::HourOutOfRange { hour } => {
                write!(f, "period start hour {} is outside 0-23", hour)
            }
            ConfigError::NonIncreasingPeriods { index } => {
                write!(
                    f,
                    "period {} does not start after the previous period",
                    index
                )
            }
            ConfigError::ZeroPixels => write!(f, "strip must have at least one pixel"),
            ConfigError::PixelCountExceedsCapacity {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "strip of {} pixels exceeds buffer capacity of {}",
                    requested, capacity
                )
            }
            ConfigError::EmptyColorCycle => {
                write!(f, "color cycle must have at least one color")
            }
            ConfigError::CapacityExceeded => write!(f, "capacity exceeded"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
