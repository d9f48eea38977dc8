//! Picking a decoder for a file and running it.
//!
//! Plain PPM goes through [`crate::ppm`]; JPEG and PNG are handed to the
//! `image` crate untouched. The caller may name the format outright,
//! otherwise the file extension decides, and as a last resort the first
//! bytes of the file are sniffed.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{DynamicImage, ImageReader, RgbImage};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::ppm::{self, DecodeError, DecodeOptions, PixelGrid};

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_SIGNATURE: &[u8] = b"\xff\xd8\xff";

/// How much of a file is read when guessing its format from content.
const SNIFF_LEN: usize = 512;

/// Formats this crate knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Ppm,
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Chooses a format from the file extension, ignoring case.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "ppm" => Some(ImageFormat::Ppm),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            _ => None,
        }
    }

    /// Guesses a format from the leading bytes of a file.
    ///
    /// A leading `#` is taken as a PPM comment line. Blank lines and
    /// whitespace before the PPM magic are skipped, as the decoder does.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        let text = bytes.trim_ascii_start();
        if text.starts_with(b"P3") || text.starts_with(b"#") {
            Some(ImageFormat::Ppm)
        } else if bytes.starts_with(JPEG_SIGNATURE) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(PNG_SIGNATURE) {
            Some(ImageFormat::Png)
        } else {
            None
        }
    }

    /// The `image` crate format for the binary formats this crate delegates.
    pub fn raster_format(self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Ppm => None,
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Png => Some(image::ImageFormat::Png),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Ppm => "ppm",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        })
    }
}

/// Returned when a format name is not one of `ppm`, `jpg`, `jpeg`, `png`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFormatError(String);

impl fmt::Display for ParseFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown image format '{}' (expected ppm, jpeg or png)", self.0)
    }
}

impl std::error::Error for ParseFormatError {}

impl FromStr for ImageFormat {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ppm" | "p3" => Ok(ImageFormat::Ppm),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}

/// A decoded image in whichever representation its format produces.
#[derive(Debug, Clone)]
pub enum LoadedImage {
    Ppm(PixelGrid),
    Raster(DynamicImage),
}

impl LoadedImage {
    pub fn width(&self) -> u32 {
        match self {
            LoadedImage::Ppm(grid) => grid.width(),
            LoadedImage::Raster(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            LoadedImage::Ppm(grid) => grid.height(),
            LoadedImage::Raster(img) => img.height(),
        }
    }

    /// Header max value; only plain PPM declares one.
    pub fn max_value(&self) -> Option<u32> {
        match self {
            LoadedImage::Ppm(grid) => Some(grid.max_value()),
            LoadedImage::Raster(_) => None,
        }
    }

    pub fn to_rgb8(&self) -> RgbImage {
        match self {
            LoadedImage::Ppm(grid) => grid.to_rgb8(),
            LoadedImage::Raster(img) => img.to_rgb8(),
        }
    }
}

/// Errors from [`load`].
#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Ppm(DecodeError),
    Image(image::ImageError),
    UnknownFormat(PathBuf),
}

impl LoadError {
    /// True when the file itself could not be found.
    pub fn is_not_found(&self) -> bool {
        match self {
            LoadError::Io { source, .. } | LoadError::Ppm(DecodeError::StreamUnavailable(source)) => {
                source.kind() == io::ErrorKind::NotFound
            }
            LoadError::Image(image::ImageError::IoError(e)) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "Cannot read {:?}: {}", path, source),
            LoadError::Ppm(e) => write!(f, "PPM decode error: {}", e),
            LoadError::Image(e) => write!(f, "Image decode error: {}", e),
            LoadError::UnknownFormat(path) => {
                write!(f, "Cannot tell the image format of {:?}", path)
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Ppm(e) => Some(e),
            LoadError::Image(e) => Some(e),
            LoadError::UnknownFormat(_) => None,
        }
    }
}

impl From<DecodeError> for LoadError {
    fn from(e: DecodeError) -> Self {
        LoadError::Ppm(e)
    }
}

impl From<image::ImageError> for LoadError {
    fn from(e: image::ImageError) -> Self {
        LoadError::Image(e)
    }
}

/// Resolves the format for `path`: explicit choice, then extension, then content.
pub fn detect_format(path: &Path, explicit: Option<ImageFormat>) -> Result<ImageFormat, LoadError> {
    if let Some(format) = explicit.or_else(|| ImageFormat::from_path(path)) {
        return Ok(format);
    }

    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut head = Vec::with_capacity(SNIFF_LEN);
    File::open(path)
        .map_err(io_err)?
        .take(SNIFF_LEN as u64)
        .read_to_end(&mut head)
        .map_err(io_err)?;

    ImageFormat::sniff(&head).ok_or_else(|| LoadError::UnknownFormat(path.to_path_buf()))
}

/// Loads the image at `path`.
///
/// `options` only affects plain PPM input.
pub fn load(
    path: impl AsRef<Path>,
    format: Option<ImageFormat>,
    options: &DecodeOptions,
) -> Result<LoadedImage, LoadError> {
    let path = path.as_ref();
    let format = detect_format(path, format)?;
    debug!("loading {:?} as {}", path, format);

    match format.raster_format() {
        None => {
            let file = File::open(path).map_err(DecodeError::StreamUnavailable)?;
            Ok(LoadedImage::Ppm(ppm::decode_with(file, options)?))
        }
        Some(raster) => {
            let file = File::open(path).map_err(|source| LoadError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let mut reader = ImageReader::new(BufReader::new(file));
            reader.set_format(raster);
            Ok(LoadedImage::Raster(reader.decode()?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::fs;

    const TINY: &str = "P3\n1 1\n255\n10 20 30\n";

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(ImageFormat::from_path(Path::new("a/b.JPEG")), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_path(Path::new("pic.Jpg")), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_path(Path::new("pic.PnG")), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_path(Path::new("pic.ppm")), Some(ImageFormat::Ppm));
        assert_eq!(ImageFormat::from_path(Path::new("png")), None);
        assert_eq!(ImageFormat::from_path(Path::new("pic.png.txt")), None);
    }

    #[test]
    fn sniff_by_magic_bytes() {
        assert_eq!(ImageFormat::sniff(b"P3\n1 1"), Some(ImageFormat::Ppm));
        assert_eq!(ImageFormat::sniff(b"# made by hand"), Some(ImageFormat::Ppm));
        assert_eq!(ImageFormat::sniff(b"\xff\xd8\xff\xe0"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(PNG_SIGNATURE), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(b"\n\n  \tP3 1 1"), Some(ImageFormat::Ppm));
        assert_eq!(ImageFormat::sniff(b"\r\n# late comment"), Some(ImageFormat::Ppm));
        assert_eq!(ImageFormat::sniff(b"   "), None);
        assert_eq!(ImageFormat::sniff(b"P6"), None);
        assert_eq!(ImageFormat::sniff(b""), None);
    }

    #[test]
    fn parse_format_names() {
        assert_eq!("JPG".parse::<ImageFormat>(), Ok(ImageFormat::Jpeg));
        assert_eq!("ppm".parse::<ImageFormat>(), Ok(ImageFormat::Ppm));
        assert!("gif".parse::<ImageFormat>().is_err());
    }

    #[test]
    fn loads_ppm_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.ppm");
        fs::write(&path, TINY).unwrap();

        let loaded = load(&path, None, &DecodeOptions::default()).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (1, 1));
        assert_eq!(loaded.max_value(), Some(255));
        assert_eq!(loaded.to_rgb8().get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn sniffs_ppm_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny");
        fs::write(&path, TINY).unwrap();

        assert!(matches!(
            load(&path, None, &DecodeOptions::default()).unwrap(),
            LoadedImage::Ppm(_)
        ));
    }

    #[test]
    fn sniffs_ppm_after_leading_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("padded");
        fs::write(&path, format!("\n\n   {TINY}")).unwrap();

        let loaded = load(&path, None, &DecodeOptions::default()).unwrap();
        assert!(matches!(loaded, LoadedImage::Ppm(_)));
        assert_eq!(loaded.to_rgb8().get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn explicit_format_beats_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actually_text.png");
        fs::write(&path, TINY).unwrap();

        let loaded = load(&path, Some(ImageFormat::Ppm), &DecodeOptions::default()).unwrap();
        assert!(matches!(loaded, LoadedImage::Ppm(_)));
    }

    #[test]
    fn png_is_delegated_to_image_crate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.png");
        RgbImage::from_pixel(3, 2, Rgb([1, 2, 3])).save(&path).unwrap();

        let loaded = load(&path, None, &DecodeOptions::default()).unwrap();
        assert!(matches!(loaded, LoadedImage::Raster(_)));
        assert_eq!((loaded.width(), loaded.height()), (3, 2));
        assert_eq!(loaded.max_value(), None);
        assert_eq!(loaded.to_rgb8().get_pixel(2, 1), &Rgb([1, 2, 3]));
    }

    #[test]
    fn missing_ppm_is_stream_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("nope.ppm"), None, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Ppm(DecodeError::StreamUnavailable(_))));
        assert!(err.is_not_found());
    }

    #[test]
    fn unknown_content_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mystery");
        fs::write(&path, "GIF89a").unwrap();

        let err = load(&path, None, &DecodeOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnknownFormat(_)));
        assert!(!err.is_not_found());
    }
}
