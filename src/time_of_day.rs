//! Coarse operating modes derived from the wall clock.

use crate::clock::{ClockReading, Weekday};
use crate::plan::ColorPlan;

/// Minute of the hour in which the hour-turn party runs.
pub const TRANSITION_MINUTE: u8 = 59;
/// Second from which the hour-turn party runs.
pub const TRANSITION_SECOND: u8 = 45;

/// Which animation family the strips should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeOfDay {
    /// The plan lights nothing; every strip is dark.
    Night,
    /// The last seconds before the hour turns; fast party crossfade.
    HourTransition,
    /// All of Friday; calm party crossfade.
    Friday,
    /// Regular per-strip display.
    Normal,
}

impl TimeOfDay {
    /// Classifies a clock reading, given the plan resolved for it.
    pub fn classify(reading: &ClockReading, plan: &ColorPlan) -> Self {
        if plan.is_dark() {
            TimeOfDay::Night
        } else if is_hour_transition(reading) {
            TimeOfDay::HourTransition
        } else if reading.weekday == Weekday::Friday {
            TimeOfDay::Friday
        } else {
            TimeOfDay::Normal
        }
    }

    /// Returns true for modes that run the party crossfade.
    pub fn is_party(self) -> bool {
        matches!(self, TimeOfDay::HourTransition | TimeOfDay::Friday)
    }
}

/// Returns true during the last seconds before the hour turns.
pub fn is_hour_transition(reading: &ClockReading) -> bool {
    reading.minute >= TRANSITION_MINUTE && reading.second >= TRANSITION_SECOND
}
