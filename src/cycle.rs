//! Color cycles for the crossfade animator.
//!
//! A [`ColorCycle`] is the list of colors a strip fades through, one after
//! the other, wrapping back to the first. Party cycles are built from the
//! party palette and shuffled afresh each time a party starts.

use crate::color::{Channels, Color, PARTY_PALETTE, white_for};
use crate::random::RandomSource;
use crate::types::ConfigError;
use heapless::Vec;

/// Maximum number of colors in a cycle.
pub const MAX_CYCLE_COLORS: usize = 12;

/// An ordered, wrapping list of colors a crossfade walks through.
///
/// A cycle always holds at least one color. Position `i` fades into position
/// `i + 1`, and the last color fades back into the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorCycle {
    colors: Vec<Color, MAX_CYCLE_COLORS>,
}

impl ColorCycle {
    /// Creates a cycle from a slice of colors.
    ///
    /// # Errors
    /// * `EmptyColorCycle` - `colors` is empty
    /// * `CapacityExceeded` - More than [`MAX_CYCLE_COLORS`] colors
    pub fn new(colors: &[Color]) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyColorCycle);
        }
        let colors = Vec::from_slice(colors).map_err(|_| ConfigError::CapacityExceeded)?;
        Ok(Self { colors })
    }

    /// Creates a two-color cycle that fades back and forth.
    pub fn pair(first: Color, second: Color) -> Self {
        let mut colors = Vec::new();
        let _ = colors.push(first);
        let _ = colors.push(second);
        Self { colors }
    }

    /// Creates a freshly shuffled party cycle for a strip.
    ///
    /// The palette gets the white that the strip can actually show.
    pub fn party<R: RandomSource>(channels: Channels, rng: &mut R) -> Self {
        let mut colors: Vec<Color, MAX_CYCLE_COLORS> = Vec::new();
        for color in PARTY_PALETTE.iter().chain(core::iter::once(&white_for(channels))) {
            let _ = colors.push(*color);
        }
        rng.shuffle(&mut colors);
        Self { colors }
    }

    /// Returns the number of colors in the cycle.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Returns true if the cycle holds no colors.
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Returns the color at `index`, if any.
    pub fn get(&self, index: usize) -> Option<Color> {
        self.colors.get(index).copied()
    }

    /// Returns the colors in order.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Returns the `(from, to)` pair a crossfade at `index` runs between.
    ///
    /// An index past the end restarts the cycle; the boolean reports whether
    /// that happened.
    pub fn pair_at(&self, index: usize) -> (Color, Color, bool) {
        let (index, restarted) = if index < self.colors.len() {
            (index, false)
        } else {
            (0, true)
        };
        let from = self.colors[index];
        let to = self.colors.get(index + 1).copied().unwrap_or(self.colors[0]);
        (from, to, restarted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{BLUE, RED, WHITE, WHITE_RGB, YELLOW};

    #[test]
    fn rejects_empty_cycle() {
        assert_eq!(ColorCycle::new(&[]), Err(ConfigError::EmptyColorCycle));
    }

    #[test]
    fn pair_wraps_last_to_first() {
        let cycle = ColorCycle::new(&[RED, BLUE, YELLOW]).unwrap();
        assert_eq!(cycle.pair_at(0), (RED, BLUE, false));
        assert_eq!(cycle.pair_at(2), (YELLOW, RED, false));
        assert_eq!(cycle.pair_at(3), (RED, BLUE, true));
    }

    #[test]
    fn party_cycle_uses_strip_white() {
        let mut rng = fastrand::Rng::with_seed(3);
        let rgb = ColorCycle::party(Channels::Rgb, &mut rng);
        let rgbw = ColorCycle::party(Channels::Rgbw, &mut rng);

        assert_eq!(rgb.len(), 9);
        assert!(rgb.colors().contains(&WHITE_RGB));
        assert!(!rgb.colors().contains(&WHITE));
        assert!(rgbw.colors().contains(&WHITE));
    }
}
