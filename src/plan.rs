//! Time-of-day color plans.
//!
//! A [`PeriodTable`] splits the day into windows, each with a background and an
//! accent color. [`PeriodTable::resolve`] turns a time of day into a
//! [`ColorPlan`]: which colors to chase, how long each frame holds, and how
//! much of the strip the accent covers.

use crate::color::{BLUE, Color, GREEN, MINT, OFF, ORANGE, PINK, PURPLE, RED, YELLOW};
use crate::random::{RandomSource, random_duration};
use crate::types::{ConfigError, HourPeriod};
use heapless::Vec;

/// Maximum number of periods in a table.
pub const MAX_PERIODS: usize = 24;

/// Hold time of the final hand-off frames before the hour turns, in seconds.
pub const HANDOFF_SECS: f32 = 0.01;

/// Default schedule: lit from morning to bedtime, dark overnight.
pub const DEFAULT_PERIODS: [HourPeriod; 9] = [
    HourPeriod::new(7, BLUE, OFF),   // morning
    HourPeriod::new(9, MINT, OFF),   // work
    HourPeriod::new(11, PINK, OFF),  // break
    HourPeriod::new(12, GREEN, OFF), // lunch
    HourPeriod::new(13, YELLOW, OFF), // afternoon
    HourPeriod::new(16, RED, OFF),   // sunset
    HourPeriod::new(18, ORANGE, OFF), // dinner
    HourPeriod::new(19, PURPLE, OFF), // bed
    HourPeriod::new(21, OFF, OFF),   // sleep
];

/// What a strip should show right now.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorPlan {
    pub primary: Color,
    pub secondary: Color,
    /// Frame hold time in seconds.
    pub duration: f32,
    /// Share of the strip in the secondary color, 0.0-1.0.
    pub fill: f32,
}

impl ColorPlan {
    pub const fn new(primary: Color, secondary: Color, duration: f32, fill: f32) -> Self {
        Self {
            primary,
            secondary,
            duration,
            fill,
        }
    }

    /// The all-off plan used when no window matches.
    pub const fn off() -> Self {
        Self::new(OFF, OFF, 1.0, 1.0)
    }

    /// Returns true if the plan would not light anything.
    pub fn is_dark(&self) -> bool {
        self.primary == OFF && self.secondary == OFF
    }
}

/// Outcome of resolving a time of day.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    /// A window matched.
    Found(ColorPlan),
    /// No window matched the hour; the plan is all off.
    Miss(ColorPlan),
}

impl Resolution {
    /// The plan to display, whether or not a window matched.
    pub fn plan(&self) -> ColorPlan {
        match self {
            Resolution::Found(plan) | Resolution::Miss(plan) => *plan,
        }
    }

    pub fn is_miss(&self) -> bool {
        matches!(self, Resolution::Miss(_))
    }
}

/// An ordered, wrapping partition of the day into hour periods.
#[derive(Debug, Clone)]
pub struct PeriodTable {
    periods: Vec<HourPeriod, MAX_PERIODS>,
}

impl PeriodTable {
    /// Creates a new table builder.
    pub fn builder() -> PeriodTableBuilder {
        PeriodTableBuilder::new()
    }

    /// Returns the periods in start order.
    pub fn periods(&self) -> &[HourPeriod] {
        &self.periods
    }

    /// Finds the `(current, next)` periods whose window contains `hour`.
    pub fn window(&self, hour: u8) -> Option<(HourPeriod, HourPeriod)> {
        let count = self.periods.len();
        (0..count)
            .map(|i| (self.periods[i], self.periods[(i + 1) % count]))
            .find(|(old, new)| {
                if old.start < new.start {
                    old.start <= hour && hour < new.start
                } else {
                    // last period wraps past midnight into the first
                    hour >= old.start || hour < new.start
                }
            })
    }

    /// Resolves the plan for a time of day.
    ///
    /// Quarter-hour pulses take priority, then the run-up into the next
    /// period during the last five minutes of the preceding hour, then the
    /// steady display of the current period. A dark period has no run-up, so
    /// the night lasts until the next period starts.
    pub fn resolve<R: RandomSource>(
        &self,
        hour: u8,
        minute: u8,
        second: u8,
        rng: &mut R,
    ) -> Resolution {
        let Some((old, new)) = self.window(hour).filter(|_| hour < 24) else {
            warn!("no period matches hour {}", hour);
            return Resolution::Miss(ColorPlan::off());
        };

        if matches!(minute, 15 | 30 | 45) && second < 3 {
            return Resolution::Found(ColorPlan::new(
                old.color,
                old.secondary,
                random_duration(rng),
                0.75,
            ));
        }

        // a dark period stays dark until the next one starts
        if !old.is_dark() && (hour + 1) % 24 == new.start {
            if minute == 59 && (50..=59).contains(&second) {
                return Resolution::Found(ColorPlan::new(new.color, old.color, HANDOFF_SECS, 0.5));
            } else if minute >= 55 {
                let fill = (f32::from(minute) - 55.0) / 5.0;
                return Resolution::Found(ColorPlan::new(
                    old.color,
                    new.color,
                    random_duration(rng),
                    fill.clamp(0.0, 1.0),
                ));
            }
        }

        Resolution::Found(ColorPlan::new(
            old.color,
            old.secondary,
            random_duration(rng),
            0.25,
        ))
    }
}

impl Default for PeriodTable {
    fn default() -> Self {
        let mut periods = Vec::new();
        for period in DEFAULT_PERIODS {
            let _ = periods.push(period);
        }
        Self { periods }
    }
}

/// Builder for constructing validated period tables.
#[derive(Debug, Default)]
pub struct PeriodTableBuilder {
    periods: Vec<HourPeriod, MAX_PERIODS>,
}

impl PeriodTableBuilder {
    /// Creates a new empty builder.
    pub fn new() -> Self {
        Self {
            periods: Vec::new(),
        }
    }

    /// Adds a period starting at `start`.
    ///
    /// # Errors
    /// * `CapacityExceeded` - More than [`MAX_PERIODS`] periods
    pub fn period(
        mut self,
        start: u8,
        color: Color,
        secondary: Color,
    ) -> Result<Self, ConfigError> {
        self.periods
            .push(HourPeriod::new(start, color, secondary))
            .map_err(|_| ConfigError::CapacityExceeded)?;
        Ok(self)
    }

    /// Builds and validates the table.
    ///
    /// # Errors
    /// * `EmptyPeriodTable` - No periods were added
    /// * `HourOutOfRange` - A period starts at hour 24 or later
    /// * `NonIncreasingPeriods` - Start hours are not strictly increasing
    pub fn build(self) -> Result<PeriodTable, ConfigError> {
        if self.periods.is_empty() {
            return Err(ConfigError::EmptyPeriodTable);
        }

        for (index, period) in self.periods.iter().enumerate() {
            if period.start >= 24 {
                return Err(ConfigError::HourOutOfRange { hour: period.start });
            }
            if index > 0 && period.start <= self.periods[index - 1].start {
                return Err(ConfigError::NonIncreasingPeriods { index });
            }
        }

        Ok(PeriodTable {
            periods: self.periods,
        })
    }
}
