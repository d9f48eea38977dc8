//! Writing grids back out as plain P3 text.

use std::io::{self, Write};

use super::grid::PixelGrid;

/// netpbm asks for lines of at most 70 characters in plain formats.
const LINE_CAPACITY: usize = 70;

/// Encodes `grid` as P3 text into `w`.
///
/// The header takes three lines; samples follow separated by single
/// spaces and wrapped before a line would exceed 70 characters.
pub fn encode<W: Write>(grid: &PixelGrid, mut w: W) -> io::Result<()> {
    write!(w, "P3\n{} {}\n{}\n", grid.width(), grid.height(), grid.max_value())?;

    let mut line = String::with_capacity(LINE_CAPACITY + 1);
    for px in grid.pixels() {
        for sample in [px.r, px.g, px.b] {
            let text = sample.to_string();
            if !line.is_empty() && line.len() + 1 + text.len() > LINE_CAPACITY {
                line.push('\n');
                w.write_all(line.as_bytes())?;
                line.clear();
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&text);
        }
    }
    if !line.is_empty() {
        line.push('\n');
        w.write_all(line.as_bytes())?;
    }
    w.flush()
}

/// Convenience wrapper around [`encode`] for in-memory use.
pub fn encode_to_string(grid: &PixelGrid) -> String {
    let mut out = Vec::new();
    encode(grid, &mut out).expect("writing to a Vec cannot fail");
    String::from_utf8_lossy(&out).into_owned()
}
