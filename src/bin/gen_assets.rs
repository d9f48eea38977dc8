/// Sample P3 file generator for trying out the CLI.
/// Run with: cargo run --bin gen_assets [output-dir]

use std::fs;
use std::path::Path;

use ppmgrid::ppm::{Pixel, PixelGrid, encode_to_string};

fn main() {
    let out_dir = std::env::args().nth(1).unwrap_or_else(|| "assets/ppm".to_string());
    let out_dir = Path::new(&out_dir);
    fs::create_dir_all(out_dir).expect("Failed to create output directory");

    // Horizontal red-to-blue ramp
    write_grid(out_dir, "gradient.ppm", &gradient(64, 16), None);

    // 8x8 checkerboard with 4-bit channels
    write_grid(out_dir, "checker.ppm", &checkerboard(32, 32, 4, 15), None);

    // Same ramp with comment lines and blank lines sprinkled through it
    write_grid(
        out_dir,
        "commented.ppm",
        &gradient(4, 2),
        Some("# generated by gen_assets\n# second comment line\n"),
    );

    println!("Assets generated successfully!");
}

fn gradient(width: u32, height: u32) -> PixelGrid {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for _ in 0..height {
        for x in 0..width {
            let t = x * 255 / (width - 1).max(1);
            pixels.push(Pixel::new(255 - t, 0, t));
        }
    }
    PixelGrid::from_pixels(width, height, 255, pixels).expect("gradient stays within 255")
}

fn checkerboard(width: u32, height: u32, cell: u32, max_value: u32) -> PixelGrid {
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / cell + y / cell) % 2 == 0 { max_value } else { 0 };
            pixels.push(Pixel::new(v, v, v));
        }
    }
    PixelGrid::from_pixels(width, height, max_value, pixels).expect("checkerboard stays within max")
}

fn write_grid(dir: &Path, name: &str, grid: &PixelGrid, comments: Option<&str>) {
    let path = dir.join(name);
    let mut text = encode_to_string(grid);
    if let Some(comments) = comments {
        // Put comments before the magic and after every line, plus an empty line
        let mut commented = String::from(comments);
        for line in text.lines() {
            commented.push_str(line);
            commented.push_str("\n# -\n\n");
        }
        text = commented;
    }

    fs::write(&path, text).expect(&format!("Failed to save {}", path.display()));
    println!("Created {}", path.display());
}
