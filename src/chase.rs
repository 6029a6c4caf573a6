//! Chase animator.
//!
//! A band of secondary-colored pixels drifts around the strip over a primary
//! background. The band's size follows the fill share; its direction is drawn
//! afresh on every call.

use crate::color::Color;
use crate::random::RandomSource;
use crate::strip::{PixelSink, Strip, StripError, TickReport};
use crate::time::{TimeInstant, TimeSource};
use crate::types::{ChaseParams, ColorDuration};
use heapless::Vec;

/// Number of pixels the band covers for a fill share.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn band_size(pixel_count: usize, fill: f32) -> usize {
    let size = libm::roundf(pixel_count as f32 * fill.clamp(0.0, 1.0));
    (size as usize).min(pixel_count)
}

/// Lays out a fresh band of `size` pixels as `sections` evenly spaced arcs.
///
/// Arc `k` starts at `k * (pixel_count / sections)`. Earlier arcs take the
/// remainder when `size` does not divide evenly, and a pixel already taken by
/// an earlier arc pushes the arc forward, so the band always has exactly
/// `size` pixels.
pub fn seed_band<const N: usize>(pixel_count: usize, size: usize, sections: usize) -> [bool; N] {
    let mut band = [false; N];
    let pixel_count = pixel_count.min(N);
    if pixel_count == 0 {
        return band;
    }

    let size = size.min(pixel_count);
    let sections = sections.clamp(1, pixel_count);
    let spacing = pixel_count / sections;
    let per_arc = size / sections;
    let remainder = size % sections;

    for arc in 0..sections {
        let mut position = arc * spacing;
        let length = per_arc + usize::from(arc < remainder);
        for _ in 0..length {
            while band[position] {
                position = (position + 1) % pixel_count;
            }
            band[position] = true;
            position = (position + 1) % pixel_count;
        }
    }

    band
}

impl<I: TimeInstant, P: PixelSink, T: TimeSource<I>, const N: usize> Strip<'_, I, P, T, N> {
    /// Moves the secondary band one step and commits the frame.
    ///
    /// The band is read back from the pixel buffer. It is laid out afresh
    /// when no pixel or every pixel shows the secondary color, or when its
    /// size no longer matches the fill share.
    ///
    /// # Errors
    /// Propagates refresh failures from [`Strip::tick`].
    pub fn chase<R: RandomSource>(
        &mut self,
        primary: Color,
        secondary: Color,
        params: ChaseParams,
        rng: &mut R,
    ) -> Result<TickReport, StripError<P::Error>> {
        let frame = self.chase_frame(primary, secondary, params, rng);
        self.tick(&frame)
    }

    fn chase_frame<R: RandomSource>(
        &self,
        primary: Color,
        secondary: Color,
        params: ChaseParams,
        rng: &mut R,
    ) -> Vec<ColorDuration, N> {
        let state = self.state();
        let pixel_count = state.pixel_count();
        let size = band_size(pixel_count, params.fill);

        let mut band = [false; N];
        let mut current = 0;
        for (slot, pixel) in band.iter_mut().zip(state.pixels()) {
            if pixel.matches(secondary, state.channels()) {
                *slot = true;
                current += 1;
            }
        }

        if current == 0 || current == pixel_count || current != size {
            band = seed_band::<N>(pixel_count, size, params.sections);
        }

        let movement = params.movement % pixel_count;
        let shift = if rng.next_f32() <= params.randomness {
            // counter-clockwise
            movement
        } else {
            // clockwise
            pixel_count - movement
        };

        let mut moved = [false; N];
        for (i, in_band) in band.iter().take(pixel_count).enumerate() {
            if *in_band {
                moved[(i + shift) % pixel_count] = true;
            }
        }

        moved
            .iter()
            .take(pixel_count)
            .map(|in_band| {
                let color = if *in_band { secondary } else { primary };
                ColorDuration::new(color, params.duration)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions<const N: usize>(band: &[bool; N]) -> heapless::Vec<usize, N> {
        band.iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn band_size_rounds_and_clamps() {
        assert_eq!(band_size(16, 0.25), 4);
        assert_eq!(band_size(16, 0.2), 3);
        assert_eq!(band_size(8, 0.75), 6);
        assert_eq!(band_size(8, 1.5), 8);
        assert_eq!(band_size(8, -1.0), 0);
    }

    #[test]
    fn seed_splits_band_into_sections() {
        let band = seed_band::<16>(16, 4, 2);
        assert_eq!(positions(&band).as_slice(), &[0, 1, 8, 9]);
    }

    #[test]
    fn seed_gives_remainder_to_first_arc() {
        let band = seed_band::<16>(16, 5, 2);
        assert_eq!(positions(&band).as_slice(), &[0, 1, 2, 8, 9]);
    }

    #[test]
    fn seed_never_loses_pixels_to_overlap() {
        for n in 1..=16 {
            for size in 0..=n {
                for sections in 1..=4 {
                    let band = seed_band::<16>(n, size, sections);
                    assert_eq!(positions(&band).len(), size, "n={n} size={size} sections={sections}");
                }
            }
        }
    }
}
