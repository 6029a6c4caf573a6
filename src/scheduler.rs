//! Cooperative task scheduler.
//!
//! Runs the clock poll and every strip's animation step at their own rates
//! without async or platform timers. The caller passes in the current instant
//! and sleeps for the returned delay:
//!
//! ```ignore
//! let mut scheduler = Scheduler::<_, 4>::for_orchestrator(poll, animate, orchestrator.ids())?;
//! loop {
//!     match scheduler.service(&mut orchestrator, &mut rtc, time.now()) {
//!         Ok(ServiceTiming::Delay(delay)) => sleep(delay),
//!         Ok(ServiceTiming::Idle) => break,
//!         Err(_) => {} // retried on the task's next run
//!     }
//! }
//! ```

use crate::clock::WallClock;
use crate::orchestrator::{Orchestrator, OrchestratorError, StripId};
use crate::random::RandomSource;
use crate::strip::PixelSink;
use crate::time::{TimeDuration, TimeInstant, TimeSource};
use crate::types::ConfigError;
use heapless::Vec;

/// Default clock poll interval, in milliseconds.
pub const DEFAULT_POLL_MILLIS: u64 = 10;

/// Default animation step interval, in milliseconds.
pub const DEFAULT_ANIMATE_MILLIS: u64 = 100;

/// What a scheduled task does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TaskKind {
    /// Read the wall clock and publish the reading.
    PollClock,
    /// Run one animation step of a strip.
    Animate(StripId),
}

/// A periodic task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Task<I: TimeInstant> {
    pub kind: TaskKind,
    pub interval: I::Duration,
    /// `None` until the first run; such a task is due immediately.
    pub next_due: Option<I>,
}

/// Timing information returned by [`Scheduler::service`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceTiming<D> {
    /// Service again after the specified delay (zero if a task is already due).
    Delay(D),

    /// No tasks are scheduled.
    Idle,
}

/// Errors reported by a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceError<E, CE> {
    /// The wall clock could not be read; the previous reading stays in effect.
    Clock(CE),

    /// An animation step failed.
    Orchestrator(OrchestratorError<E>),
}

impl<E: core::fmt::Debug, CE: core::fmt::Debug> core::fmt::Display for ServiceError<E, CE> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ServiceError::Clock(err) => write!(f, "clock read failed: {:?}", err),
            ServiceError::Orchestrator(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug, CE: core::fmt::Debug> std::error::Error for ServiceError<E, CE> {}

/// Fixed-capacity list of periodic tasks.
pub struct Scheduler<I: TimeInstant, const MAX_TASKS: usize> {
    tasks: Vec<Task<I>, MAX_TASKS>,
}

impl<I: TimeInstant, const MAX_TASKS: usize> Default for Scheduler<I, MAX_TASKS> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<I, const MAX_TASKS: usize> Scheduler<I, MAX_TASKS>
where
    I: TimeInstant + PartialOrd,
{
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Builds the standard task set: one clock poll followed by one animation
    /// task per strip.
    ///
    /// The poll should run well ahead of the animation, ten times faster or
    /// more, so classification changes take effect on the next step.
    ///
    /// # Errors
    /// Returns `CapacityExceeded` if the tasks do not fit in `MAX_TASKS`.
    pub fn for_orchestrator(
        poll_interval: I::Duration,
        animate_interval: I::Duration,
        ids: impl IntoIterator<Item = StripId>,
    ) -> Result<Self, ConfigError> {
        let mut scheduler = Self::new();
        scheduler.add(TaskKind::PollClock, poll_interval)?;
        for id in ids {
            scheduler.add(TaskKind::Animate(id), animate_interval)?;
        }
        Ok(scheduler)
    }

    /// Adds a task that is due immediately.
    ///
    /// # Errors
    /// Returns `CapacityExceeded` if the scheduler is full.
    pub fn add(&mut self, kind: TaskKind, interval: I::Duration) -> Result<(), ConfigError> {
        self.tasks
            .push(Task {
                kind,
                interval,
                next_due: None,
            })
            .map_err(|_| ConfigError::CapacityExceeded)
    }

    /// Returns the earliest due task and reschedules it.
    ///
    /// Ties go to the task added first. A task that fell more than one
    /// interval behind is rescheduled from `now`, skipping the backlog.
    pub fn next_due(&mut self, now: I) -> Option<TaskKind> {
        let mut earliest: Option<usize> = None;
        for (idx, task) in self.tasks.iter().enumerate() {
            if !is_due(task, now) {
                continue;
            }
            let earlier = match earliest {
                None => true,
                Some(best) => runs_before(task, &self.tasks[best]),
            };
            if earlier {
                earliest = Some(idx);
            }
        }

        let idx = earliest?;
        reschedule(&mut self.tasks[idx], now);
        Some(self.tasks[idx].kind)
    }

    /// Returns how long until the next task is due, or `None` if there are no tasks.
    pub fn delay_until_next(&self, now: I) -> Option<I::Duration> {
        self.tasks
            .iter()
            .map(|task| match task.next_due {
                Some(due) if due > now => due.duration_since(now),
                _ => I::Duration::ZERO,
            })
            .reduce(|a, b| if b.as_millis() < a.as_millis() { b } else { a })
    }

    /// Runs every due task once, in the order they were added, and reports
    /// when to service again.
    ///
    /// A failing task is still rescheduled, so it is retried on its next
    /// run. The remaining due tasks run regardless.
    ///
    /// # Errors
    /// Returns the first task error encountered.
    pub fn service<'t, P, T, R, C, const N: usize, const MAX_STRIPS: usize>(
        &mut self,
        orchestrator: &mut Orchestrator<'t, I, P, T, R, N, MAX_STRIPS>,
        clock: &mut C,
        now: I,
    ) -> Result<ServiceTiming<I::Duration>, ServiceError<P::Error, C::Error>>
    where
        P: PixelSink,
        T: TimeSource<I>,
        R: RandomSource,
        C: WallClock,
    {
        let mut first_error = None;

        for task in self.tasks.iter_mut() {
            if !is_due(task, now) {
                continue;
            }
            reschedule(task, now);

            let result = match task.kind {
                TaskKind::PollClock => orchestrator
                    .poll_clock(clock)
                    .map(|_| ())
                    .map_err(ServiceError::Clock),
                TaskKind::Animate(id) => orchestrator
                    .animate(id)
                    .map(|_| ())
                    .map_err(ServiceError::Orchestrator),
            };

            if let Err(err) = result {
                first_error.get_or_insert(err);
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }

        Ok(self
            .delay_until_next(now)
            .map_or(ServiceTiming::Idle, ServiceTiming::Delay))
    }

    /// Returns the scheduled tasks.
    pub fn tasks(&self) -> &[Task<I>] {
        &self.tasks
    }

    /// Returns the number of scheduled tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if no tasks are scheduled.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

fn is_due<I: TimeInstant + PartialOrd>(task: &Task<I>, now: I) -> bool {
    task.next_due.is_none_or(|due| due <= now)
}

fn runs_before<I: TimeInstant + PartialOrd>(task: &Task<I>, other: &Task<I>) -> bool {
    match (task.next_due, other.next_due) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(a), Some(b)) => a < b,
    }
}

fn reschedule<I: TimeInstant + PartialOrd>(task: &mut Task<I>, now: I) {
    let from_now = now.checked_add(task.interval).unwrap_or(now);
    let next = match task.next_due {
        Some(due) => due
            .checked_add(task.interval)
            .filter(|next| *next > now)
            .unwrap_or(from_now),
        None => from_now,
    };
    task.next_due = Some(next);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct Millis(u64);

    impl TimeDuration for Millis {
        const ZERO: Self = Millis(0);

        fn as_millis(&self) -> u64 {
            self.0
        }

        fn from_millis(millis: u64) -> Self {
            Millis(millis)
        }

        fn saturating_sub(self, other: Self) -> Self {
            Millis(self.0.saturating_sub(other.0))
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct At(u64);

    impl TimeInstant for At {
        type Duration = Millis;

        fn duration_since(&self, earlier: Self) -> Millis {
            Millis(self.0 - earlier.0)
        }

        fn checked_add(self, duration: Millis) -> Option<Self> {
            Some(At(self.0 + duration.0))
        }

        fn checked_sub(self, duration: Millis) -> Option<Self> {
            self.0.checked_sub(duration.0).map(At)
        }
    }

    fn standard() -> Scheduler<At, 4> {
        Scheduler::for_orchestrator(Millis(10), Millis(100), [StripId(0), StripId(1)]).unwrap()
    }

    #[test]
    fn new_tasks_run_in_insertion_order() {
        let mut scheduler = standard();
        assert_eq!(scheduler.next_due(At(0)), Some(TaskKind::PollClock));
        assert_eq!(scheduler.next_due(At(0)), Some(TaskKind::Animate(StripId(0))));
        assert_eq!(scheduler.next_due(At(0)), Some(TaskKind::Animate(StripId(1))));
        assert_eq!(scheduler.next_due(At(0)), None);
        assert_eq!(scheduler.delay_until_next(At(0)), Some(Millis(10)));
    }

    #[test]
    fn earliest_deadline_wins() {
        let mut scheduler = standard();
        while scheduler.next_due(At(0)).is_some() {}

        assert_eq!(scheduler.next_due(At(95)), Some(TaskKind::PollClock));
        // poll now due at 105, after both animations
        assert_eq!(scheduler.next_due(At(100)), Some(TaskKind::Animate(StripId(0))));
        assert_eq!(scheduler.next_due(At(100)), Some(TaskKind::Animate(StripId(1))));
        assert_eq!(scheduler.delay_until_next(At(100)), Some(Millis(5)));
    }

    #[test]
    fn late_task_skips_backlog() {
        let mut scheduler = standard();
        while scheduler.next_due(At(0)).is_some() {}

        assert_eq!(scheduler.next_due(At(55)), Some(TaskKind::PollClock));
        assert_eq!(scheduler.tasks()[0].next_due, Some(At(65)));
        assert_eq!(scheduler.next_due(At(55)), None);
    }

    #[test]
    fn on_time_task_keeps_cadence() {
        let mut scheduler = standard();
        while scheduler.next_due(At(0)).is_some() {}

        assert_eq!(scheduler.next_due(At(13)), Some(TaskKind::PollClock));
        assert_eq!(scheduler.tasks()[0].next_due, Some(At(20)));
    }

    #[test]
    fn capacity_is_enforced() {
        let result = Scheduler::<At, 2>::for_orchestrator(
            Millis(10),
            Millis(100),
            [StripId(0), StripId(1)],
        );
        assert_eq!(result.err(), Some(ConfigError::CapacityExceeded));
    }

    #[test]
    fn empty_scheduler_has_no_delay() {
        let scheduler = Scheduler::<At, 2>::new();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.delay_until_next(At(0)), None);
    }
}
