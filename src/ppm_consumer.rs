//! Handing decoded images to the `image` crate and writing them back out.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

use image::RgbImage;
use log::info;

use crate::format::{self, ImageFormat, LoadError, LoadedImage};
use crate::ppm::{self, DecodeOptions, Pixel, PixelGrid};

/// An image flattened to 8-bit RGB, whatever format it came from.
pub struct PpmFile {
    pub width: u32,
    pub height: u32,
    pub image: RgbImage,
}

impl PpmFile {
    pub fn from_loaded(loaded: &LoadedImage) -> Self {
        let image = loaded.to_rgb8();
        PpmFile {
            width: image.width(),
            height: image.height(),
            image,
        }
    }

    /// Rebuilds a grid with a max value of 255 from the 8-bit buffer.
    pub fn to_grid(&self) -> PixelGrid {
        let pixels: Vec<Pixel> = self
            .image
            .pixels()
            .map(|p| Pixel::new(p[0].into(), p[1].into(), p[2].into()))
            .collect();
        // u8 channels always fit under 255
        PixelGrid::from_decoded(self.width, self.height, 255, pixels)
    }
}

pub fn read_ppm_file(
    file_path: &Path,
    format: Option<ImageFormat>,
    options: &DecodeOptions,
) -> Result<PpmFile, LoadError> {
    let loaded = format::load(file_path, format, options)?;
    Ok(PpmFile::from_loaded(&loaded))
}

/// Errors that can occur when writing an image.
#[derive(Debug)]
pub enum SaveError {
    Io(io::Error),
    Image(image::ImageError),
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Image(e) => write!(f, "Image encode error: {}", e),
        }
    }
}

impl std::error::Error for SaveError {}

impl From<io::Error> for SaveError {
    fn from(e: io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<image::ImageError> for SaveError {
    fn from(e: image::ImageError) -> Self {
        SaveError::Image(e)
    }
}

/// Writes `loaded` to `path` in `target` format.
///
/// PPM input written as PPM keeps its original max value; everything else
/// goes through an 8-bit RGB buffer.
pub fn save(loaded: &LoadedImage, path: &Path, target: ImageFormat) -> Result<(), SaveError> {
    match (loaded, target.raster_format()) {
        (LoadedImage::Ppm(grid), None) => write_p3(grid, path)?,
        (LoadedImage::Raster(_), None) => {
            let grid = PpmFile::from_loaded(loaded).to_grid();
            write_p3(&grid, path)?;
        }
        (_, Some(raster)) => loaded.to_rgb8().save_with_format(path, raster)?,
    }
    info!("wrote {:?} as {}", path, target);
    Ok(())
}

fn write_p3(grid: &PixelGrid, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    ppm::encode(grid, BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::fs;

    #[test]
    fn reads_ppm_into_rgb8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("two.ppm");
        fs::write(&path, "P3\n2 1\n255\n255 0 0 0 255 0\n").unwrap();

        let file = read_ppm_file(&path, None, &DecodeOptions::default()).unwrap();
        assert_eq!((file.width, file.height), (2, 1));
        assert_eq!(file.image.get_pixel(1, 0), &Rgb([0, 255, 0]));
    }

    #[test]
    fn ppm_to_ppm_keeps_max_value() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.ppm");
        let grid = PixelGrid::from_pixels(1, 1, 1000, vec![Pixel::new(1000, 500, 0)]).unwrap();

        save(&LoadedImage::Ppm(grid.clone()), &out, ImageFormat::Ppm).unwrap();
        let back = ppm::decode(File::open(&out).unwrap()).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn raster_to_ppm_with_forced_input_format() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("pixels.bin");
        let out = dir.path().join("pixels.ppm");
        RgbImage::from_pixel(2, 2, Rgb([200, 100, 50]))
            .save_with_format(&src, image::ImageFormat::Png)
            .unwrap();

        let file = read_ppm_file(&src, Some(ImageFormat::Png), &DecodeOptions::default()).unwrap();
        assert_eq!((file.width, file.height), (2, 2));

        let loaded = format::load(&src, Some(ImageFormat::Png), &DecodeOptions::default()).unwrap();
        save(&loaded, &out, ImageFormat::Ppm).unwrap();
        let grid = ppm::decode(File::open(&out).unwrap()).unwrap();
        assert_eq!(grid.max_value(), 255);
        assert_eq!(grid.pixels(), &[Pixel::new(200, 100, 50); 4]);
    }

    #[test]
    fn ppm_to_png_and_back() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.png");
        let grid = PixelGrid::from_pixels(2, 1, 255, vec![Pixel::new(9, 8, 7), Pixel::new(1, 2, 3)])
            .unwrap();

        save(&LoadedImage::Ppm(grid.clone()), &out, ImageFormat::Png).unwrap();
        let file = read_ppm_file(&out, None, &DecodeOptions::default()).unwrap();
        assert_eq!(file.to_grid(), grid);
    }
}
