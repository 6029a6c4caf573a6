//! Random source abstraction.
//!
//! Every random decision in the engine (hold times, chase direction, party
//! cycle order) goes through [`RandomSource`], so tests can script the exact
//! sequence of draws.

/// Trait for abstracting random number generation.
pub trait RandomSource {
    /// Returns a uniformly distributed value in `[0.0, 1.0)`.
    fn next_f32(&mut self) -> f32;

    /// Returns a uniformly distributed index in `0..bound`. `bound` is never zero.
    fn next_index(&mut self, bound: usize) -> usize;

    /// Returns a uniformly distributed value between `low` and `high`.
    fn uniform(&mut self, low: f32, high: f32) -> f32 {
        low + (high - low) * self.next_f32()
    }

    /// Shuffles a slice in place (Fisher-Yates).
    fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

impl RandomSource for fastrand::Rng {
    fn next_f32(&mut self) -> f32 {
        self.f32()
    }

    fn next_index(&mut self, bound: usize) -> usize {
        self.usize(..bound)
    }
}

/// Quick sparkle hold range, in seconds.
pub const SPARKLE_SECS: (f32, f32) = (0.1, 0.3);
/// Slow hold range, in seconds.
pub const SLOW_HOLD_SECS: (f32, f32) = (1.0, 2.0);

/// Draws an irregular hold time: usually a quick sparkle, sometimes a slow hold.
pub fn random_duration<R: RandomSource>(rng: &mut R) -> f32 {
    if rng.next_f32() > 0.25 {
        rng.uniform(SPARKLE_SECS.0, SPARKLE_SECS.1)
    } else {
        rng.uniform(SLOW_HOLD_SECS.0, SLOW_HOLD_SECS.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        values: [f32; 4],
        pos: usize,
    }

    impl RandomSource for Scripted {
        fn next_f32(&mut self) -> f32 {
            let v = self.values[self.pos % self.values.len()];
            self.pos += 1;
            v
        }

        fn next_index(&mut self, _bound: usize) -> usize {
            0
        }
    }

    #[test]
    fn random_duration_picks_sparkle_above_quarter() {
        let mut rng = Scripted {
            values: [0.9, 0.5, 0.0, 0.0],
            pos: 0,
        };
        let d = random_duration(&mut rng);
        assert!((d - 0.2).abs() < 1e-6);
    }

    #[test]
    fn random_duration_picks_slow_hold_at_or_below_quarter() {
        let mut rng = Scripted {
            values: [0.25, 0.5, 0.0, 0.0],
            pos: 0,
        };
        let d = random_duration(&mut rng);
        assert!((d - 1.5).abs() < 1e-6);
    }

    #[test]
    fn fastrand_durations_stay_in_range() {
        let mut rng = fastrand::Rng::with_seed(7);
        for _ in 0..500 {
            let d = random_duration(&mut rng);
            assert!((0.1..=0.3).contains(&d) || (1.0..=2.0).contains(&d));
        }
    }

    #[test]
    fn shuffle_keeps_every_item() {
        let mut rng = fastrand::Rng::with_seed(42);
        let mut items = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        rng.shuffle(&mut items);
        items.sort_unstable();
        assert_eq!(items, [1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }
}
