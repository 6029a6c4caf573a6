//! [`PixelSink`] adapters.
//!
//! [`SmartLedsSink`] wraps any [`SmartLedsWrite`] driver whose color type is
//! [`RGB8`] or [`RGBW<u8>`], so WS2812, SK6812 and similar drivers can be
//! plugged into a strip directly.
//!
//! An orchestrator holds one sink type for all of its strips. To drive strips
//! on different drivers, convert their errors to a common type with
//! [`PixelSink::map_err`] and hand each strip a [`DynSink`]:
//!
//! ```ignore
//! let mut main = SmartLedsSink::new(ws2812).map_err(LedError::Main);
//! let mut status = SmartLedsSink::new(sk6812).map_err(LedError::Status);
//! let main = Strip::new(&main_config, &mut main as DynSink<'_, LedError>, &time)?;
//! let status = Strip::new(&status_config, &mut status as DynSink<'_, LedError>, &time)?;
//! ```

use crate::color::Color;
use crate::strip::PixelSink;
use smart_leds::{RGB8, RGBW, SmartLedsWrite, White};

/// Default output brightness, about 70%.
pub const DEFAULT_BRIGHTNESS: u8 = 179;

impl From<Color> for RGB8 {
    fn from(color: Color) -> Self {
        RGB8::new(color.red, color.green, color.blue)
    }
}

impl From<Color> for RGBW<u8> {
    fn from(color: Color) -> Self {
        RGBW {
            r: color.red,
            g: color.green,
            b: color.blue,
            a: White(color.white),
        }
    }
}

/// Pixel sink writing through a `smart-leds` driver.
#[derive(Debug)]
pub struct SmartLedsSink<W> {
    writer: W,
    brightness: u8,
}

impl<W> SmartLedsSink<W> {
    /// Wraps a driver, writing at [`DEFAULT_BRIGHTNESS`].
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            brightness: DEFAULT_BRIGHTNESS,
        }
    }

    /// Sets the output brightness (255 = colors as given).
    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = brightness;
        self
    }

    /// Returns the output brightness.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Returns a reference to the wrapped driver.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Unwraps the driver.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// A pixel sink behind a trait-object reference, so strips on different
/// drivers have the same type.
pub type DynSink<'a, E> = &'a mut dyn PixelSink<Error = E>;

impl<S: PixelSink + ?Sized> PixelSink for &mut S {
    type Error = S::Error;

    fn write(&mut self, pixels: &[Color]) -> Result<(), Self::Error> {
        (**self).write(pixels)
    }
}

/// Sink adapter converting errors, built by [`PixelSink::map_err`].
#[derive(Debug)]
pub struct MapErr<S, F> {
    sink: S,
    f: F,
}

impl<S, F> MapErr<S, F> {
    pub(crate) fn new(sink: S, f: F) -> Self {
        Self { sink, f }
    }

    /// Returns a reference to the wrapped sink.
    pub fn inner(&self) -> &S {
        &self.sink
    }

    /// Unwraps the sink.
    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S, F, E> PixelSink for MapErr<S, F>
where
    S: PixelSink,
    F: FnMut(S::Error) -> E,
{
    type Error = E;

    fn write(&mut self, pixels: &[Color]) -> Result<(), Self::Error> {
        self.sink.write(pixels).map_err(&mut self.f)
    }
}

impl<W> PixelSink for SmartLedsSink<W>
where
    W: SmartLedsWrite,
    W::Color: From<Color>,
{
    type Error = W::Error;

    fn write(&mut self, pixels: &[Color]) -> Result<(), Self::Error> {
        let brightness = self.brightness;
        self.writer
            .write(pixels.iter().map(|pixel| W::Color::from(pixel.scaled(brightness))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{PINK, WHITE};
    use heapless::Vec;

    struct RecordingRgbw {
        frames: Vec<Vec<RGBW<u8>, 8>, 4>,
    }

    impl SmartLedsWrite for RecordingRgbw {
        type Error = ();
        type Color = RGBW<u8>;

        fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
        where
            T: IntoIterator<Item = I>,
            I: Into<Self::Color>,
        {
            let frame = iterator.into_iter().map(Into::into).collect();
            self.frames.push(frame).map_err(|_| ())
        }
    }

    #[test]
    fn writes_white_channel_with_brightness() {
        let mut sink = SmartLedsSink::new(RecordingRgbw { frames: Vec::new() }).with_brightness(255);
        sink.write(&[WHITE, PINK]).unwrap();

        let frame = &sink.writer().frames[0];
        assert_eq!(frame[0].a, White(255));
        assert_eq!((frame[1].r, frame[1].g, frame[1].b), (231, 84, 128));
    }

    #[test]
    fn map_err_converts_driver_errors() {
        #[derive(Debug, PartialEq)]
        struct Full(usize);

        let mut sink = SmartLedsSink::new(RecordingRgbw { frames: Vec::new() }).map_err(|()| Full(4));
        for _ in 0..4 {
            sink.write(&[PINK]).unwrap();
        }
        assert_eq!(sink.write(&[PINK]), Err(Full(4)));
        assert_eq!(sink.inner().writer().frames.len(), 4);
    }

    #[test]
    fn default_brightness_dims_output() {
        let mut sink = SmartLedsSink::new(RecordingRgbw { frames: Vec::new() });
        sink.write(&[WHITE]).unwrap();
        assert_eq!(sink.writer().frames[0][0].a, White(179));
    }
}
