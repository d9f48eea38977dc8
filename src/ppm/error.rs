//! Errors produced while decoding plain PPM text.

use std::fmt;
use std::io;

/// The slot a token was expected to fill when decoding failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRole {
    Magic,
    Width,
    Height,
    MaxValue,
    Red,
    Green,
    Blue,
}

impl TokenRole {
    pub(crate) const CHANNELS: [TokenRole; 3] = [TokenRole::Red, TokenRole::Green, TokenRole::Blue];
}

impl fmt::Display for TokenRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenRole::Magic => "magic identifier",
            TokenRole::Width => "width",
            TokenRole::Height => "height",
            TokenRole::MaxValue => "max value",
            TokenRole::Red => "red channel",
            TokenRole::Green => "green channel",
            TokenRole::Blue => "blue channel",
        })
    }
}

/// Everything that can go wrong in [`decode`](super::decode).
///
/// Each variant is terminal: no partial grid is ever returned alongside it.
#[derive(Debug)]
pub enum DecodeError {
    /// The input could not be read to completion.
    StreamUnavailable(io::Error),
    /// The first token was not `P3`.
    InvalidMagic { found: String },
    /// A token could not be parsed as the integer its role requires.
    MalformedToken { token: String, role: TokenRole },
    /// The input ended while a token for `role` was still expected.
    /// `index` is the zero-based position of that missing token.
    TruncatedInput { role: TokenRole, index: usize },
    /// A channel was negative, or above `max_value` under the strict policy.
    ChannelOutOfRange {
        value: i64,
        max_value: u32,
        x: u32,
        y: u32,
    },
    /// `width * height` does not fit in memory addressing.
    DimensionOverflow { width: u32, height: u32 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::StreamUnavailable(e) => write!(f, "Input unavailable: {}", e),
            DecodeError::InvalidMagic { found } => write!(
                f,
                "Invalid PPM file: plain RAW file should begin with P3, found {:?}",
                found
            ),
            DecodeError::MalformedToken { token, role } => {
                write!(f, "Cannot parse {:?} as {}", token, role)
            }
            DecodeError::TruncatedInput { role, index } => write!(
                f,
                "Unexpected end of input: expected {} at token {}",
                role, index
            ),
            DecodeError::ChannelOutOfRange {
                value,
                max_value,
                x,
                y,
            } => write!(
                f,
                "Channel value {} of pixel ({},{}) is outside 0..={}",
                value, x, y, max_value
            ),
            DecodeError::DimensionOverflow { width, height } => {
                write!(f, "Image dimensions {}x{} are too large", width, height)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::StreamUnavailable(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> Self {
        DecodeError::StreamUnavailable(e)
    }
}
