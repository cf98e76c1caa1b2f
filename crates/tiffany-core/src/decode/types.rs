//! Core types for image decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bitmap::{Bitmap, PixelFormat};
use crate::luminance::gray_palette;
use crate::Color;

/// Why a file could not become a page.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// No data is available under the requested path.
    #[error("File not found: {0}")]
    NotFound(String),

    /// I/O error during file reading.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for DecodeError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => DecodeError::NotFound(err.to_string()),
            _ => DecodeError::IoError(err.to_string()),
        }
    }
}

/// Resampling filter used when scaling page bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterType {
    Nearest,
    /// Triangle filter; the thumbnail default.
    #[default]
    Bilinear,
    Lanczos3,
}

impl FilterType {
    pub fn to_image_filter(self) -> image::imageops::FilterType {
        match self {
            FilterType::Nearest => image::imageops::FilterType::Nearest,
            FilterType::Bilinear => image::imageops::FilterType::Triangle,
            FilterType::Lanczos3 => image::imageops::FilterType::Lanczos3,
        }
    }
}

/// The EXIF orientation tag of a scan, values 1 through 8.
///
/// Anything else reads as `Normal`. Variants name the transform that turns
/// the stored pixels upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    #[default]
    Normal = 1,
    FlipHorizontal = 2,
    Rotate180 = 3,
    FlipVertical = 4,
    /// Mirror across the main diagonal.
    Transpose = 5,
    Rotate90CW = 6,
    /// Mirror across the anti-diagonal.
    Transverse = 7,
    Rotate270CW = 8,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// What a decoder hands back before the image becomes a page.
///
/// Palette-based sources are kept apart so the collection can collapse them
/// to grayscale on load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceImage {
    /// Grayscale or RGB pixels, ready to use.
    Direct(Bitmap),
    /// One palette index per pixel.
    Indexed {
        width: u32,
        height: u32,
        indices: Vec<u8>,
        palette: Vec<Color>,
    },
}

impl SourceImage {
    /// Whether this source still needs palette conversion.
    pub fn is_indexed(&self) -> bool {
        matches!(self, SourceImage::Indexed { .. })
    }

    /// Produce the bitmap a page stores.
    ///
    /// Indexed images become 8-bit grayscale through the palette's
    /// luminance. Indices past the end of the palette map to black.
    pub fn into_bitmap(self) -> Bitmap {
        match self {
            SourceImage::Direct(bitmap) => bitmap,
            SourceImage::Indexed {
                width,
                height,
                indices,
                palette,
            } => {
                let lut = gray_palette(&palette);
                let pixels = indices
                    .iter()
                    .map(|&i| lut.get(i as usize).copied().unwrap_or(0))
                    .collect();
                Bitmap::new(width, height, PixelFormat::Gray8, pixels)
            }
        }
    }
}

impl From<Bitmap> for SourceImage {
    fn from(bitmap: Bitmap) -> Self {
        SourceImage::Direct(bitmap)
    }
}
