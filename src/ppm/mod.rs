//! Plain (ASCII, `P3`) PPM support.
//!
//! Decoding runs in two stages over an owned buffer: comment lines are
//! stripped, then a [`Tokens`] cursor walks the remaining text to build a
//! [`PixelGrid`].
//!
//! ```text
//! P3
//! # comment lines start with '#'
//! <width> <height>
//! <max_value>
//! <r> <g> <b> ...   (width * height triples, row-major)
//! ```

mod decoder;
mod encoder;
mod error;
mod grid;

pub use decoder::{
    ChannelPolicy, DecodeOptions, Tokens, decode, decode_str, decode_with, strip_comments,
};
pub use encoder::{encode, encode_to_string};
pub use error::{DecodeError, TokenRole};
pub use grid::{GridError, Pixel, PixelGrid};
