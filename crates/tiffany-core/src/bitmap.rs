//! Owned 2D pixel buffers.
//!
//! Pages are stored either as 8-bit grayscale (the usual format for scanned
//! text) or 8-bit RGB. All pixel data is row-major with no padding.

use image::{DynamicImage, GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::Color;

/// Pixel layout of a [`Bitmap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    /// One luminance byte per pixel.
    Gray8,
    /// Three bytes per pixel, red first.
    Rgb8,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// A decoded page image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Layout of `pixels`.
    pub format: PixelFormat,
    /// Pixel data in row-major order.
    /// Length is `width * height * format.channels()`.
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a new Bitmap with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * format.channels(),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            format,
            pixels,
        }
    }

    /// A bitmap of the given size filled with one color.
    pub fn filled(width: u32, height: u32, format: PixelFormat, color: Color) -> Self {
        let count = width as usize * height as usize;
        let pixels = match format {
            PixelFormat::Gray8 => vec![color.luma(); count],
            PixelFormat::Rgb8 => [color.r, color.g, color.b].repeat(count),
        };
        Self::new(width, height, format, pixels)
    }

    /// A zero-sized placeholder.
    pub fn empty() -> Self {
        Self::new(0, 0, PixelFormat::Rgb8, Vec::new())
    }

    /// Create a Bitmap from an image::RgbImage.
    pub fn from_rgb_image(img: RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, PixelFormat::Rgb8, img.into_raw())
    }

    /// Create a Bitmap from an image::GrayImage.
    pub fn from_gray_image(img: GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(width, height, PixelFormat::Gray8, img.into_raw())
    }

    /// Convert any decoded image, keeping grayscale sources grayscale.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        if img.color().has_color() {
            Self::from_rgb_image(img.into_rgb8())
        } else {
            Self::from_gray_image(img.into_luma8())
        }
    }

    /// Convert to an image::DynamicImage for further processing.
    ///
    /// Returns `None` only if the pixel buffer does not match the dimensions.
    pub fn to_dynamic(&self) -> Option<DynamicImage> {
        match self.format {
            PixelFormat::Gray8 => {
                GrayImage::from_raw(self.width, self.height, self.pixels.clone())
                    .map(DynamicImage::ImageLuma8)
            }
            PixelFormat::Rgb8 => RgbImage::from_raw(self.width, self.height, self.pixels.clone())
                .map(DynamicImage::ImageRgb8),
        }
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Get the size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.format.channels()
    }

    /// Read one pixel. Grayscale pixels come back as neutral gray.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let i = self.offset(x, y);
        match self.format {
            PixelFormat::Gray8 => Color::gray(self.pixels[i]),
            PixelFormat::Rgb8 => Color::rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]),
        }
    }

    /// Write one pixel; colors written to grayscale bitmaps collapse to
    /// their luminance. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        match self.format {
            PixelFormat::Gray8 => self.pixels[i] = color.luma(),
            PixelFormat::Rgb8 => {
                self.pixels[i] = color.r;
                self.pixels[i + 1] = color.g;
                self.pixels[i + 2] = color.b;
            }
        }
    }

    /// The bytes of a single pixel.
    #[inline]
    pub(crate) fn pixel_bytes(&self, x: u32, y: u32) -> &[u8] {
        let i = self.offset(x, y);
        &self.pixels[i..i + self.format.channels()]
    }

    /// Return an RGB copy (grayscale expands to equal channels).
    pub fn to_rgb(&self) -> Bitmap {
        match self.format {
            PixelFormat::Rgb8 => self.clone(),
            PixelFormat::Gray8 => {
                let pixels = self.pixels.iter().flat_map(|&v| [v, v, v]).collect();
                Bitmap::new(self.width, self.height, PixelFormat::Rgb8, pixels)
            }
        }
    }

    /// Return a grayscale copy.
    pub fn to_grayscale(&self) -> Bitmap {
        match self.format {
            PixelFormat::Gray8 => self.clone(),
            PixelFormat::Rgb8 => {
                let pixels = self
                    .pixels
                    .chunks_exact(3)
                    .map(|c| crate::luminance::luma_u8(c[0], c[1], c[2]))
                    .collect();
                Bitmap::new(self.width, self.height, PixelFormat::Gray8, pixels)
            }
        }
    }

    /// Return a black and white grayscale copy. Levels above `threshold`
    /// become white.
    pub fn to_binary(&self, threshold: u8) -> Bitmap {
        let mut gray = self.to_grayscale();
        for v in &mut gray.pixels {
            *v = if *v > threshold { 255 } else { 0 };
        }
        gray
    }
}
