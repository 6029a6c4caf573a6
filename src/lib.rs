#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`PeriodTable`**: Partitions the day into hour periods and resolves a time of day into a `ColorPlan`
//! - **`ColorPlan`**: Primary and secondary colors, hold time and fill share to show right now
//! - **`TimeOfDay`**: Coarse mode (`Night`, `HourTransition`, `Friday`, `Normal`) derived from the clock
//! - **`Strip`**: One LED strip with per-pixel hold countdowns, driven by the tick engine
//! - **`ColorCycle`**: Wrapping color list walked by the crossfade animator
//! - **`Orchestrator`**: Owns every strip, publishes clock readings and routes each strip to its animator
//! - **`Scheduler`**: Runs the clock poll and animation steps at their own rates
//! - **`PixelSink`**: Trait to implement for your LED driver (or use `SmartLedsSink`; mix drivers through `DynSink`)
//! - **`WallClock`**: Trait to implement for your real-time clock
//! - **`TimeSource`**: Trait to implement for your monotonic timer
//! - **`RandomSource`**: Trait for the random draws, implemented for `fastrand::Rng`
//!
//! Colors are 8-bit RGBW. Strips declare which channels they actually have,
//! and every comparison made on behalf of a strip ignores the channels it
//! lacks.

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

#[macro_use]
mod fmt;

pub mod chase;
pub mod clock;
pub mod color;
pub mod crossfade;
pub mod cycle;
pub mod orchestrator;
pub mod plan;
pub mod random;
pub mod scheduler;
pub mod sink;
pub mod strip;
pub mod time;
pub mod time_of_day;
pub mod types;

pub use clock::{ClockReading, WallClock, Weekday};
pub use color::{Channels, Color};
pub use cycle::ColorCycle;
pub use orchestrator::{Orchestrator, OrchestratorError, Snapshot, StripId, StripRole};
pub use plan::{ColorPlan, PeriodTable, PeriodTableBuilder, Resolution};
pub use random::RandomSource;
pub use scheduler::{Scheduler, ServiceError, ServiceTiming, Task, TaskKind};
pub use sink::{DynSink, MapErr, SmartLedsSink};
pub use strip::{PixelSink, Strip, StripConfig, StripError, StripState, TickReport};
#[cfg(feature = "std")]
pub use time::StdTimeSource;
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use time_of_day::TimeOfDay;
pub use types::{ChaseParams, ColorDuration, ConfigError, FadeTiming, HourPeriod};
