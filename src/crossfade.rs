//! Crossfade ("cycle between") animator.
//!
//! Each call converts one more pixel from the cycle's current color to the
//! next one, starting from the first pixel. Once the strip is (nearly) fully
//! converted, the whole strip is held on the new color for the pause time.
//! The tick engine notices the strip settling on a single color and moves the
//! cycle on, so the next call starts fading towards the following color.

use crate::cycle::ColorCycle;
use crate::strip::{PixelSink, Strip, StripError, TickReport};
use crate::time::{TimeInstant, TimeSource};
use crate::types::{ColorDuration, FadeTiming};
use heapless::Vec;

impl<I: TimeInstant, P: PixelSink, T: TimeSource<I>, const N: usize> Strip<'_, I, P, T, N> {
    /// Advances the crossfade through `colors` by one step.
    ///
    /// # Errors
    /// Propagates refresh failures from [`Strip::tick`].
    pub fn cycle_between(
        &mut self,
        colors: &ColorCycle,
        timing: FadeTiming,
    ) -> Result<TickReport, StripError<P::Error>> {
        let frame = self.crossfade_frame(colors, timing);
        self.tick(&frame)
    }

    /// Advances the crossfade using the strip's configured pacing.
    ///
    /// # Errors
    /// Propagates refresh failures from [`Strip::tick`].
    pub fn cycle_between_default(
        &mut self,
        colors: &ColorCycle,
    ) -> Result<TickReport, StripError<P::Error>> {
        let timing = self.state().default_timing();
        self.cycle_between(colors, timing)
    }

    fn crossfade_frame(&mut self, colors: &ColorCycle, timing: FadeTiming) -> Vec<ColorDuration, N> {
        let state = self.state_mut();
        state.remember_cycle(colors);

        let (from, to, restarted) = colors.pair_at(state.cycle_index());
        if restarted {
            state.set_cycle_index(0);
        }

        let pixel_count = state.pixel_count();
        let num_on = state.count_matching(to);

        if num_on + 1 < pixel_count {
            (0..pixel_count)
                .map(|i| {
                    let color = if i <= num_on { to } else { from };
                    ColorDuration::new(color, timing.step)
                })
                .collect()
        } else {
            (0..pixel_count)
                .map(|_| ColorDuration::new(to, timing.pause))
                .collect()
        }
    }
}
