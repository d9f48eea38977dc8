//! Decoding of plain-text (`P3`) PPM images into validated pixel grids,
//! with JPEG and PNG loading delegated to the `image` crate.
//!
//! ```
//! use ppmgrid::ppm::{self, Pixel};
//!
//! let grid = ppm::decode(&b"P3\n# comment\n2 1\n255\n255 0 0  0 255 0\n"[..]).unwrap();
//! assert_eq!(grid.width(), 2);
//! assert_eq!(grid.at(1, 0), Some(Pixel::new(0, 255, 0)));
//! ```

pub mod config;
pub mod format;
pub mod ppm;
pub mod ppm_consumer;

pub use config::{Config, ConfigError};
pub use format::{ImageFormat, LoadError, LoadedImage, load};
pub use ppm::{DecodeError, DecodeOptions, Pixel, PixelGrid, decode};
