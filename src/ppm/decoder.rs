use std::io::Read;
use std::num::IntErrorKind;

use log::{debug, trace};
use serde::Deserialize;

use super::error::{DecodeError, TokenRole};
use super::grid::{Pixel, PixelGrid};

/// The only magic identifier this decoder accepts.
const MAGIC: &str = "P3";

/// How channel values are checked against the header's max value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelPolicy {
    /// Every channel must lie in `0..=max_value`.
    #[default]
    Strict,
    /// Channels above `max_value` are kept as read. Negative values are
    /// still rejected.
    Lenient,
}

/// Knobs for a single decode call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DecodeOptions {
    pub channels: ChannelPolicy,
}

impl DecodeOptions {
    pub fn lenient() -> Self {
        Self {
            channels: ChannelPolicy::Lenient,
        }
    }
}

/// Decodes a P3 image with the default (strict) options.
pub fn decode<R: Read>(reader: R) -> Result<PixelGrid, DecodeError> {
    decode_with(reader, &DecodeOptions::default())
}

/// Reads `reader` to the end, then decodes it.
///
/// The reader is consumed, so a file handed in here is closed on every
/// return path.
pub fn decode_with<R: Read>(mut reader: R, options: &DecodeOptions) -> Result<PixelGrid, DecodeError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    trace!("read {} bytes of PPM input", bytes.len());

    let text = String::from_utf8_lossy(&bytes);
    decode_str(&text, options)
}

/// Decodes P3 text that is already in memory.
pub fn decode_str(text: &str, options: &DecodeOptions) -> Result<PixelGrid, DecodeError> {
    let tokens = Tokens::new(strip_comments(text));
    decode_tokens(tokens, options)
}

/// Drops every line whose first character is `#` and joins the rest with `\n`.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. Empty lines are skipped
/// without being treated as comments.
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.split(['\r', '\n']) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// A forward-only cursor over the whitespace separated tokens of an owned buffer.
#[derive(Debug)]
pub struct Tokens {
    buf: String,
    pos: usize,
    consumed: usize,
}

impl Tokens {
    pub fn new(buf: String) -> Self {
        Self {
            buf,
            pos: 0,
            consumed: 0,
        }
    }

    /// Returns the next token, or `None` once the buffer is exhausted.
    pub fn next_token(&mut self) -> Option<&str> {
        let rest = &self.buf[self.pos..];
        let Some(start) = rest.find(|c: char| !is_separator(c)) else {
            self.pos = self.buf.len();
            return None;
        };
        let len = rest[start..]
            .find(is_separator)
            .unwrap_or(rest.len() - start);

        let begin = self.pos + start;
        self.pos = begin + len;
        self.consumed += 1;
        Some(&self.buf[begin..begin + len])
    }

    /// Number of tokens handed out so far.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Bytes not yet scanned.
    fn remaining_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn has_remaining(&self) -> bool {
        self.buf[self.pos..].chars().any(|c| !is_separator(c))
    }
}

/// Token separators: ASCII space, tab, line feed, carriage return, vertical
/// tab and form feed. Unicode spaces are part of a token.
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

fn decode_tokens(mut tokens: Tokens, options: &DecodeOptions) -> Result<PixelGrid, DecodeError> {
    let magic = expect_token(&mut tokens, TokenRole::Magic)?;
    if magic != MAGIC {
        return Err(DecodeError::InvalidMagic {
            found: magic.to_string(),
        });
    }

    let width = read_u32(&mut tokens, TokenRole::Width)?;
    let height = read_u32(&mut tokens, TokenRole::Height)?;
    let max_value = read_u32(&mut tokens, TokenRole::MaxValue)?;
    debug!("P3 header: {}x{}, max value {}", width, height, max_value);

    let count = (width as usize)
        .checked_mul(height as usize)
        .filter(|n| n.checked_mul(3).is_some())
        .ok_or(DecodeError::DimensionOverflow { width, height })?;

    // Each channel needs at least one digit and one separator, so a short
    // buffer bounds the allocation even when the header lies.
    let mut pixels = Vec::with_capacity(count.min(tokens.remaining_len() / 6 + 1));
    for y in 0..height {
        for x in 0..width {
            let mut rgb = [0u32; 3];
            for (slot, role) in rgb.iter_mut().zip(TokenRole::CHANNELS) {
                *slot = read_channel(&mut tokens, role, max_value, options.channels, (x, y))?;
            }
            pixels.push(Pixel::new(rgb[0], rgb[1], rgb[2]));
        }
    }

    if tokens.has_remaining() {
        debug!(
            "ignoring trailing data after {} tokens of pixel data",
            tokens.consumed()
        );
    }

    Ok(PixelGrid::from_decoded(width, height, max_value, pixels))
}

fn expect_token(tokens: &mut Tokens, role: TokenRole) -> Result<&str, DecodeError> {
    let index = tokens.consumed();
    tokens
        .next_token()
        .ok_or(DecodeError::TruncatedInput { role, index })
}

fn read_u32(tokens: &mut Tokens, role: TokenRole) -> Result<u32, DecodeError> {
    let token = expect_token(tokens, role)?;
    token.parse::<u32>().map_err(|_| DecodeError::MalformedToken {
        token: token.to_string(),
        role,
    })
}

fn read_channel(
    tokens: &mut Tokens,
    role: TokenRole,
    max_value: u32,
    policy: ChannelPolicy,
    (x, y): (u32, u32),
) -> Result<u32, DecodeError> {
    let token = expect_token(tokens, role)?;
    // Digits too long for i64 are still a number, just far out of range
    let value = match token.parse::<i64>() {
        Ok(value) => value,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => {
                return Err(DecodeError::MalformedToken {
                    token: token.to_string(),
                    role,
                });
            }
        },
    };

    let limit = match policy {
        ChannelPolicy::Strict => max_value,
        ChannelPolicy::Lenient => u32::MAX,
    };
    u32::try_from(value)
        .ok()
        .filter(|&v| v <= limit)
        .ok_or(DecodeError::ChannelOutOfRange {
            value,
            max_value,
            x,
            y,
        })
}
