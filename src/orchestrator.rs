//! Orchestrator owning every strip of the light.
//!
//! The clock-poll task publishes a [`ClockReading`] through
//! [`Orchestrator::publish`] (or [`Orchestrator::poll_clock`]); each strip's
//! animation task calls [`Orchestrator::animate`], which reads the published
//! mode and routes the strip to the right animator.

use crate::clock::{ClockReading, WallClock, Weekday};
use crate::color::{BLUE, CYAN, Color, OFF, PINK, RED, WHITE, WHITE_RGB, YELLOW};
use crate::cycle::ColorCycle;
use crate::plan::{ColorPlan, PeriodTable};
use crate::random::{RandomSource, random_duration};
use crate::strip::{PixelSink, Strip, StripError, TickReport};
use crate::time::{TimeInstant, TimeSource};
use crate::time_of_day::TimeOfDay;
use crate::types::{ChaseParams, FadeTiming};

/// Calendar strip colors, Sunday first.
pub const CALENDAR_COLORS: [Color; 7] = [WHITE_RGB, BLUE, CYAN, YELLOW, PINK, CYAN, RED];

/// Share of the calendar strip lit by the chasing gap.
pub const CALENDAR_FILL: f32 = 0.25;

/// Step hold range of the party crossfade, in seconds.
pub const PARTY_STEP_SECS: (f32, f32) = (0.01, 0.07);

/// Pause range of the crossfade before the hour turns, in seconds.
pub const TRANSITION_PAUSE_SECS: (f32, f32) = (0.1, 0.25);

/// Pause range of the Friday crossfade, in seconds.
pub const FRIDAY_PAUSE_SECS: (f32, f32) = (0.5, 1.5);

/// An identifier for a strip within an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StripId(pub usize);

impl From<usize> for StripId {
    fn from(id: usize) -> Self {
        StripId(id)
    }
}

impl From<StripId> for usize {
    fn from(id: StripId) -> Self {
        id.0
    }
}

/// What a strip shows during normal hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StripRole {
    /// Chases the current period's colors.
    Primary,
    /// Fades slowly between off and white.
    Status,
    /// Chases the day-of-week color.
    Calendar,
}

/// The most recent clock reading and what was derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Snapshot {
    pub reading: ClockReading,
    pub plan: ColorPlan,
    pub time_of_day: TimeOfDay,
}

/// Errors that can occur during orchestrator operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OrchestratorError<E> {
    /// The specified strip does not exist.
    UnknownStrip(StripId),

    /// Attempted to add a strip with an ID that already exists.
    DuplicateStrip(StripId),

    /// The strip ID exceeds the orchestrator's capacity.
    StripIdOutOfBounds { id: StripId, capacity: usize },

    /// A strip operation failed.
    Strip(StripError<E>),
}

impl<E: core::fmt::Debug> core::fmt::Display for OrchestratorError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            OrchestratorError::UnknownStrip(id) => {
                write!(f, "strip {} does not exist", id.0)
            }
            OrchestratorError::DuplicateStrip(id) => {
                write!(f, "strip {} already exists", id.0)
            }
            OrchestratorError::StripIdOutOfBounds { id, capacity } => {
                write!(
                    f,
                    "strip {} exceeds orchestrator capacity of {}",
                    id.0, capacity
                )
            }
            OrchestratorError::Strip(err) => write!(f, "strip error: {}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for OrchestratorError<E> {}

impl<E> From<StripError<E>> for OrchestratorError<E> {
    fn from(err: StripError<E>) -> Self {
        OrchestratorError::Strip(err)
    }
}

struct Slot<'t, I: TimeInstant, P: PixelSink, T: TimeSource<I>, const N: usize> {
    strip: Strip<'t, I, P, T, N>,
    role: StripRole,
    party: Option<ColorCycle>,
}

/// Owns every strip and decides what each one shows.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `I` - Time instant type
/// * `P` - Pixel sink type, shared by all strips (use [`DynSink`](crate::sink::DynSink) to mix drivers)
/// * `T` - Time source type
/// * `R` - Random source type
/// * `N` - Maximum number of pixels per strip
/// * `MAX_STRIPS` - Maximum number of strips
pub struct Orchestrator<
    't,
    I: TimeInstant,
    P: PixelSink,
    T: TimeSource<I>,
    R: RandomSource,
    const N: usize,
    const MAX_STRIPS: usize,
> {
    strips: [Option<Slot<'t, I, P, T, N>>; MAX_STRIPS],
    table: PeriodTable,
    rng: R,
    status_cycle: ColorCycle,
    snapshot: Option<Snapshot>,
}

impl<'t, I, P, T, R, const N: usize, const MAX_STRIPS: usize>
    Orchestrator<'t, I, P, T, R, N, MAX_STRIPS>
where
    I: TimeInstant,
    P: PixelSink,
    T: TimeSource<I>,
    R: RandomSource,
{
    /// Creates an orchestrator with no strips and no clock reading yet.
    pub fn new(table: PeriodTable, rng: R) -> Self {
        Self {
            strips: core::array::from_fn(|_| None),
            table,
            rng,
            status_cycle: ColorCycle::pair(OFF, WHITE),
            snapshot: None,
        }
    }

    /// Adds a strip under `id`.
    ///
    /// # Errors
    /// * `DuplicateStrip` - A strip with this ID already exists
    /// * `StripIdOutOfBounds` - The ID exceeds the orchestrator's capacity
    pub fn add_strip(
        &mut self,
        id: StripId,
        strip: Strip<'t, I, P, T, N>,
        role: StripRole,
    ) -> Result<(), OrchestratorError<P::Error>> {
        let idx = id.0;

        if idx >= MAX_STRIPS {
            return Err(OrchestratorError::StripIdOutOfBounds {
                id,
                capacity: MAX_STRIPS,
            });
        }

        if self.strips[idx].is_some() {
            return Err(OrchestratorError::DuplicateStrip(id));
        }

        self.strips[idx] = Some(Slot {
            strip,
            role,
            party: None,
        });
        Ok(())
    }

    /// Reads the wall clock and publishes the reading.
    ///
    /// # Errors
    /// Returns the clock's error; the previous snapshot stays in effect.
    pub fn poll_clock<C: WallClock>(&mut self, clock: &mut C) -> Result<TimeOfDay, C::Error> {
        let reading = clock.read()?;
        Ok(self.publish(reading))
    }

    /// Resolves and classifies a clock reading, and makes it the one the
    /// animation steps follow.
    ///
    /// Party cycles are shuffled afresh when the hour-turn party starts, and
    /// for any strip without one on a Friday. They are dropped once neither
    /// party mode applies.
    pub fn publish(&mut self, reading: ClockReading) -> TimeOfDay {
        let resolution = self
            .table
            .resolve(reading.hour, reading.minute, reading.second, &mut self.rng);
        let plan = resolution.plan();
        let time_of_day = TimeOfDay::classify(&reading, &plan);
        let previous = self.snapshot.map(|snapshot| snapshot.time_of_day);

        if previous != Some(time_of_day) {
            debug!("time of day is now {:?}", time_of_day);
        }

        let transition_started =
            time_of_day == TimeOfDay::HourTransition && previous != Some(TimeOfDay::HourTransition);

        for slot in self.strips.iter_mut().flatten() {
            if transition_started || (time_of_day == TimeOfDay::Friday && slot.party.is_none()) {
                debug!("shuffling party colors for strip {}", slot.strip.name());
                slot.party = Some(ColorCycle::party(slot.strip.state().channels(), &mut self.rng));
            } else if !time_of_day.is_party() {
                slot.party = None;
            }
        }

        self.snapshot = Some(Snapshot {
            reading,
            plan,
            time_of_day,
        });
        time_of_day
    }

    /// Runs one animation step of a strip.
    ///
    /// # Returns
    /// * `Ok(Some(report))` - What the step did
    /// * `Ok(None)` - Nothing has been published yet, so there is nothing to show
    /// * `Err` - Unknown strip, or the strip's refresh failed
    pub fn animate(&mut self, id: StripId) -> Result<Option<TickReport>, OrchestratorError<P::Error>> {
        let Some(snapshot) = self.snapshot else {
            return Ok(None);
        };

        let slot = self
            .strips
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(OrchestratorError::UnknownStrip(id))?;
        let rng = &mut self.rng;

        let report = match snapshot.time_of_day {
            TimeOfDay::Night => slot.strip.turn_off()?,
            TimeOfDay::HourTransition | TimeOfDay::Friday => {
                let pause_range = if snapshot.time_of_day == TimeOfDay::Friday {
                    FRIDAY_PAUSE_SECS
                } else {
                    TRANSITION_PAUSE_SECS
                };
                let pause = rng.uniform(pause_range.0, pause_range.1);
                let step = rng.uniform(PARTY_STEP_SECS.0, PARTY_STEP_SECS.1);

                let channels = slot.strip.state().channels();
                let cycle = slot
                    .party
                    .get_or_insert_with(|| ColorCycle::party(channels, rng));
                slot.strip.cycle_between(cycle, FadeTiming::new(step, pause))?
            }
            TimeOfDay::Normal => match slot.role {
                StripRole::Primary => {
                    let plan = snapshot.plan;
                    slot.strip.chase(
                        plan.primary,
                        plan.secondary,
                        ChaseParams::new(plan.duration, plan.fill),
                        rng,
                    )?
                }
                StripRole::Status => slot.strip.cycle_between_default(&self.status_cycle)?,
                StripRole::Calendar => {
                    let color = calendar_color(snapshot.reading.weekday);
                    let params = ChaseParams::new(random_duration(rng), CALENDAR_FILL);
                    slot.strip.chase(color, OFF, params, rng)?
                }
            },
        };

        Ok(Some(report))
    }

    /// Runs one animation step of every strip.
    ///
    /// Every strip is stepped even if an earlier one fails.
    ///
    /// # Errors
    /// Returns the first error encountered.
    pub fn animate_all(&mut self) -> Result<(), OrchestratorError<P::Error>> {
        let mut first_error = None;
        for idx in 0..MAX_STRIPS {
            if self.strips[idx].is_none() {
                continue;
            }
            if let Err(err) = self.animate(StripId(idx)) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Returns the last published snapshot.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Returns the current time-of-day mode.
    pub fn time_of_day(&self) -> Option<TimeOfDay> {
        self.snapshot.map(|snapshot| snapshot.time_of_day)
    }

    /// Returns the period table.
    pub fn table(&self) -> &PeriodTable {
        &self.table
    }

    /// Returns the specified strip.
    ///
    /// # Errors
    /// Returns `UnknownStrip` if the strip does not exist.
    pub fn strip(&self, id: StripId) -> Result<&Strip<'t, I, P, T, N>, OrchestratorError<P::Error>> {
        self.slot(id).map(|slot| &slot.strip)
    }

    /// Returns the specified strip mutably.
    ///
    /// # Errors
    /// Returns `UnknownStrip` if the strip does not exist.
    pub fn strip_mut(
        &mut self,
        id: StripId,
    ) -> Result<&mut Strip<'t, I, P, T, N>, OrchestratorError<P::Error>> {
        self.strips
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .map(|slot| &mut slot.strip)
            .ok_or(OrchestratorError::UnknownStrip(id))
    }

    /// Returns the role of the specified strip.
    ///
    /// # Errors
    /// Returns `UnknownStrip` if the strip does not exist.
    pub fn role(&self, id: StripId) -> Result<StripRole, OrchestratorError<P::Error>> {
        self.slot(id).map(|slot| slot.role)
    }

    /// Returns the party cycle currently assigned to a strip.
    ///
    /// # Errors
    /// Returns `UnknownStrip` if the strip does not exist.
    pub fn party_cycle(&self, id: StripId) -> Result<Option<&ColorCycle>, OrchestratorError<P::Error>> {
        self.slot(id).map(|slot| slot.party.as_ref())
    }

    /// Returns the number of strips.
    pub fn len(&self) -> usize {
        self.strips.iter().filter(|s| s.is_some()).count()
    }

    /// Returns true if no strips have been added.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if a strip with the given ID exists.
    pub fn contains(&self, id: StripId) -> bool {
        id.0 < MAX_STRIPS && self.strips[id.0].is_some()
    }

    /// Returns the IDs of all strips, in ID order.
    pub fn ids(&self) -> impl Iterator<Item = StripId> + '_ {
        self.strips
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(idx, _)| StripId(idx))
    }

    fn slot(&self, id: StripId) -> Result<&Slot<'t, I, P, T, N>, OrchestratorError<P::Error>> {
        self.strips
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(OrchestratorError::UnknownStrip(id))
    }
}

/// The calendar strip's color for a day of the week.
pub fn calendar_color(weekday: Weekday) -> Color {
    CALENDAR_COLORS[weekday.index()]
}
