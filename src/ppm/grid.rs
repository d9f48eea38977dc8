use std::fmt;

use image::{Rgb, RgbImage};

/// One RGB sample triple as read from a P3 file.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Pixel {
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

impl Pixel {
    pub fn new(r: u32, g: u32, b: u32) -> Pixel {
        Pixel { r, g, b }
    }

    fn channels(&self) -> [u32; 3] {
        [self.r, self.g, self.b]
    }
}

/// Reasons [`PixelGrid::from_pixels`] refuses to build a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    LengthMismatch { expected: usize, actual: usize },
    ChannelOutOfRange { index: usize, value: u32, max_value: u32 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::LengthMismatch { expected, actual } => {
                write!(f, "Expected {} pixels, got {}", expected, actual)
            }
            GridError::ChannelOutOfRange {
                index,
                value,
                max_value,
            } => write!(
                f,
                "Pixel {} has channel value {} above max {}",
                index, value, max_value
            ),
        }
    }
}

impl std::error::Error for GridError {}

/// A fully decoded image: header metadata plus `width * height` pixels.
///
/// Pixels are stored row-major, top row first, each row left to right.
/// The grid is immutable; use [`PixelGrid::into_pixels`] to get an owned
/// buffer that can be edited and fed back through [`PixelGrid::from_pixels`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    max_value: u32,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Builds a grid, checking the pixel count and every channel against `max_value`.
    pub fn from_pixels(
        width: u32,
        height: u32,
        max_value: u32,
        pixels: Vec<Pixel>,
    ) -> Result<Self, GridError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        for (index, px) in pixels.iter().enumerate() {
            if let Some(&value) = px.channels().iter().find(|&&c| c > max_value) {
                return Err(GridError::ChannelOutOfRange {
                    index,
                    value,
                    max_value,
                });
            }
        }
        Ok(Self::from_decoded(width, height, max_value, pixels))
    }

    /// The decoder has already validated `pixels` against its channel policy.
    pub(crate) fn from_decoded(width: u32, height: u32, max_value: u32, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            max_value,
            pixels,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The declared maximum channel intensity from the header.
    #[inline]
    pub fn max_value(&self) -> u32 {
        self.max_value
    }

    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Returns the pixel in column `x` of row `y`, or `None` outside the grid.
    pub fn at(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Iterates over rows from top to bottom.
    ///
    /// Always yields `height` rows; for a zero-width grid they are empty.
    pub fn rows(&self) -> impl Iterator<Item = &[Pixel]> {
        let width = self.width as usize;
        (0..self.height as usize).map(move |y| &self.pixels[y * width..(y + 1) * width])
    }

    pub fn into_pixels(self) -> Vec<Pixel> {
        self.pixels
    }

    /// Rescales every channel to 8 bits and returns an `image` buffer.
    ///
    /// Channels above `max_value` (possible under the lenient policy) clamp
    /// to 255. A `max_value` of zero yields a black image.
    pub fn to_rgb8(&self) -> RgbImage {
        let max = self.max_value;
        let scale = |c: u32| -> u8 {
            if max == 0 {
                0
            } else if max == 255 {
                c.min(255) as u8
            } else {
                let c = u64::from(c.min(max));
                let max = u64::from(max);
                ((c * 255 + max / 2) / max) as u8
            }
        };
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let px = self.pixels[y as usize * self.width as usize + x as usize];
            Rgb([scale(px.r), scale(px.g), scale(px.b)])
        })
    }
}
