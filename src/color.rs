//! Pixel colors and channel capabilities.
//!
//! A [`Color`] always carries four 8-bit channels. Strips built from RGB-only
//! pixels ignore the white channel, so any comparison made on behalf of a strip
//! goes through [`Color::matches`] with that strip's [`Channels`].

use palette::{FromColor, Hsv, Srgb};

/// Which channels a strip's pixels actually have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channels {
    /// Red, green and blue only.
    #[default]
    Rgb,
    /// Red, green, blue and a dedicated white LED.
    Rgbw,
}

impl Channels {
    /// Number of significant channels per pixel.
    pub const fn count(self) -> usize {
        match self {
            Channels::Rgb => 3,
            Channels::Rgbw => 4,
        }
    }
}

/// An 8-bit-per-channel RGBW color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub white: u8,
}

impl Color {
    /// Creates a color from all four channels.
    pub const fn new(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    /// Creates a color with the white channel off.
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 0)
    }

    /// Returns the channels as an array in `[r, g, b, w]` order.
    pub const fn channels(self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.white]
    }

    /// Compares two colors over the channels a strip actually has.
    pub fn matches(self, other: Color, channels: Channels) -> bool {
        let n = channels.count();
        self.channels()[..n] == other.channels()[..n]
    }

    /// Returns true if every significant channel is zero.
    pub fn is_off(self, channels: Channels) -> bool {
        self.matches(OFF, channels)
    }

    /// Scales every channel by `brightness / 255`.
    pub fn scaled(self, brightness: u8) -> Self {
        let scale = |c: u8| -> u8 {
            // (c * b) / 255 rounded down, never exceeds c
            let product = u16::from(c) * u16::from(brightness);
            #[allow(clippy::cast_possible_truncation)]
            {
                (product / 255) as u8
            }
        };
        Self::new(
            scale(self.red),
            scale(self.green),
            scale(self.blue),
            scale(self.white),
        )
    }

    /// Creates a color from a floating point sRGB value (0.0-1.0 range).
    pub fn from_srgb(color: Srgb) -> Self {
        let rgb: Srgb<u8> = color.into_format();
        Self::rgb(rgb.red, rgb.green, rgb.blue)
    }

    /// Creates a color from HSV components (hue in degrees, the rest 0.0-1.0).
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        Self::from_srgb(Srgb::from_color(Hsv::new(hue, saturation, value)))
    }
}

impl From<Srgb<u8>> for Color {
    fn from(rgb: Srgb<u8>) -> Self {
        Self::rgb(rgb.red, rgb.green, rgb.blue)
    }
}

/// All channels dark.
pub const OFF: Color = Color::new(0, 0, 0, 0);
/// The dedicated white LED of an RGBW pixel. Dark on RGB-only strips.
pub const WHITE: Color = Color::new(0, 0, 0, 255);
/// White mixed from the color LEDs, for RGB-only strips.
pub const WHITE_RGB: Color = Color::rgb(100, 100, 100);

/// Warm yellow.
pub const YELLOW: Color = Color::rgb(200, 155, 0);
/// Soft green.
pub const GREEN: Color = Color::rgb(50, 150, 50);
/// Dim blue.
pub const BLUE: Color = Color::rgb(0, 0, 100);
/// Purple.
pub const PURPLE: Color = Color::rgb(180, 50, 180);
/// Pink.
pub const PINK: Color = Color::rgb(231, 84, 128);
/// Deep orange.
pub const ORANGE: Color = Color::rgb(155, 50, 0);
/// Dim red.
pub const RED: Color = Color::rgb(100, 5, 5);
/// Dim cyan.
pub const CYAN: Color = Color::rgb(0, 100, 100);
/// Mint green.
pub const MINT: Color = Color::rgb(62, 180, 137);

/// Colors a party cycle is shuffled from, before the strip's own white is added.
pub const PARTY_PALETTE: [Color; 8] = [RED, ORANGE, YELLOW, GREEN, MINT, BLUE, PURPLE, PINK];

/// The white that shows up on a strip with the given channels.
pub const fn white_for(channels: Channels) -> Color {
    match channels {
        Channels::Rgb => WHITE_RGB,
        Channels::Rgbw => WHITE,
    }
}
