//! Wall-clock readings.
//!
//! The hardware real-time clock is an external collaborator: implement
//! [`WallClock`] for your RTC driver and hand it to the orchestrator. Only
//! time-of-day and day-of-week drive the animation; the calendar fields are
//! carried for display.

/// Day of the week, Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Weekday {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

impl Weekday {
    /// Converts an RTC weekday register value (0 = Sunday) to a weekday.
    pub fn from_index(index: u8) -> Option<Self> {
        Some(match index {
            0 => Self::Sunday,
            1 => Self::Monday,
            2 => Self::Tuesday,
            3 => Self::Wednesday,
            4 => Self::Thursday,
            5 => Self::Friday,
            6 => Self::Saturday,
            _ => return None,
        })
    }

    /// Position in the week, 0 = Sunday.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A single reading of the real-time clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockReading {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub weekday: Weekday,
}

impl ClockReading {
    /// Creates a reading with only the time-of-day fields that matter set.
    ///
    /// The calendar date is left at 2000-01-01.
    pub const fn at(hour: u8, minute: u8, second: u8, weekday: Weekday) -> Self {
        Self {
            year: 2000,
            month: 1,
            day: 1,
            hour,
            minute,
            second,
            weekday,
        }
    }
}

/// Trait for abstracting the real-time clock.
pub trait WallClock {
    /// Error reported by the clock peripheral.
    type Error;

    /// Reads the current date and time.
    fn read(&mut self) -> Result<ClockReading, Self::Error>;
}
