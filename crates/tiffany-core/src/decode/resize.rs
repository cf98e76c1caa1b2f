//! Bitmap resampling for thumbnails.
//!
//! Resizing goes through the `image` crate's filters and keeps the pixel
//! format of the source, so grayscale pages produce grayscale icons.

use image::imageops;

use super::{DecodeError, FilterType};
use crate::bitmap::{Bitmap, PixelFormat};

/// Resample a bitmap to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` for a zero target size and
/// `DecodeError::CorruptedFile` if the pixel buffer does not match the
/// bitmap's dimensions.
pub fn resize(
    image: &Bitmap,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Bitmap, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let source = image
        .to_dynamic()
        .ok_or_else(|| DecodeError::CorruptedFile("pixel buffer size mismatch".to_string()))?;
    let filter = filter.to_image_filter();

    Ok(match image.format {
        PixelFormat::Gray8 => {
            Bitmap::from_gray_image(imageops::resize(&source.to_luma8(), width, height, filter))
        }
        PixelFormat::Rgb8 => {
            Bitmap::from_rgb_image(imageops::resize(&source.to_rgb8(), width, height, filter))
        }
    })
}

/// Scale a bitmap up or down so it fits a `size × size` box, preserving
/// aspect ratio. The longer edge ends up exactly `size` pixels long.
pub fn scale_to_box(image: &Bitmap, size: u32, filter: FilterType) -> Result<Bitmap, DecodeError> {
    if size == 0 || image.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }
    let (width, height) = fit_dimensions(image.width, image.height, size);
    resize(image, width, height, filter)
}

/// Dimensions that fit `width × height` into a square of side `size`.
pub fn fit_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    if width >= height {
        let scaled = (height as f64 * size as f64 / width as f64).round() as u32;
        (size, scaled.max(1))
    } else {
        let scaled = (width as f64 * size as f64 / height as f64).round() as u32;
        (scaled.max(1), size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn gradient(width: u32, height: u32) -> Bitmap {
        let mut img = Bitmap::filled(width, height, PixelFormat::Rgb8, Color::BLACK);
        for y in 0..height {
            for x in 0..width {
                let r = (x * 255 / width.max(1)) as u8;
                let g = (y * 255 / height.max(1)) as u8;
                img.set_pixel(x, y, Color::rgb(r, g, 128));
            }
        }
        img
    }

    #[test]
    fn test_resize_basic() {
        let resized = resize(&gradient(100, 50), 50, 25, FilterType::Bilinear).unwrap();
        assert_eq!(resized.dimensions(), (50, 25));
        assert_eq!(resized.byte_size(), 50 * 25 * 3);
    }

    #[test]
    fn test_resize_keeps_gray_format() {
        let img = Bitmap::filled(40, 20, PixelFormat::Gray8, Color::gray(60));
        let resized = resize(&img, 10, 5, FilterType::Nearest).unwrap();
        assert_eq!(resized.format, PixelFormat::Gray8);
        assert!(resized.pixels.iter().all(|&v| v == 60));
    }

    #[test]
    fn test_resize_zero_dimensions_error() {
        let img = gradient(10, 10);
        assert!(resize(&img, 0, 5, FilterType::Bilinear).is_err());
        assert!(resize(&img, 5, 0, FilterType::Bilinear).is_err());
    }

    #[test]
    fn test_scale_to_box_upscales() {
        let resized = scale_to_box(&gradient(20, 10), 100, FilterType::Bilinear).unwrap();
        assert_eq!(resized.dimensions(), (100, 50));
    }

    #[test]
    fn test_scale_to_box_downscales_portrait() {
        let resized = scale_to_box(&gradient(400, 600), 100, FilterType::Bilinear).unwrap();
        assert_eq!(resized.dimensions(), (67, 100));
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(6000, 4000, 2560), (2560, 1707));
        assert_eq!(fit_dimensions(4000, 6000, 2560), (1707, 2560));
        assert_eq!(fit_dimensions(4000, 4000, 256), (256, 256));
        assert_eq!(fit_dimensions(0, 0, 256), (0, 0));
        assert_eq!(fit_dimensions(1000, 1, 100), (100, 1));
    }
}
