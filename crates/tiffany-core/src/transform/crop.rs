//! Cropping to a pixel rectangle.
//!
//! The rectangle is clipped to the bitmap, so callers can pass a region that
//! was mapped from view space without bounds-checking it first.

use crate::bitmap::Bitmap;
use crate::geometry::PixelRect;

/// Copy the pixels inside `rect` into a new bitmap.
///
/// # Arguments
///
/// * `image` - Source bitmap
/// * `rect` - Region to keep, in pixel coordinates
///
/// # Returns
///
/// The cropped bitmap, or `None` if `rect` does not overlap `image`.
pub fn crop(image: &Bitmap, rect: PixelRect) -> Option<Bitmap> {
    let left = rect.x.min(image.width);
    let top = rect.y.min(image.height);
    let right = rect.right().min(image.width);
    let bottom = rect.bottom().min(image.height);
    if right <= left || bottom <= top {
        return None;
    }

    // Fast path: full crop returns a clone
    if left == 0 && top == 0 && right == image.width && bottom == image.height {
        return Some(image.clone());
    }

    let channels = image.format.channels();
    let out_width = right - left;
    let out_height = bottom - top;
    let row_bytes = out_width as usize * channels;
    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for y in top..bottom {
        let start = (y as usize * image.width as usize + left as usize) * channels;
        output.extend_from_slice(&image.pixels[start..start + row_bytes]);
    }

    Some(Bitmap::new(out_width, out_height, image.format, output))
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::bitmap::PixelFormat;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep reasonable for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=64, 1u32..=64)
    }

    fn rect_strategy() -> impl Strategy<Value = PixelRect> {
        (0u32..80, 0u32..80, 0u32..80, 0u32..80).prop_map(|(x, y, w, h)| PixelRect::new(x, y, w, h))
    }

    proptest! {
        /// Property: Output dimensions don't exceed input dimensions.
        #[test]
        fn prop_output_bounded_by_input(
            (width, height) in dimensions_strategy(),
            rect in rect_strategy(),
        ) {
            let img = Bitmap::new(width, height, PixelFormat::Gray8, vec![7; (width * height) as usize]);
            if let Some(out) = crop(&img, rect) {
                prop_assert!(out.width >= 1 && out.width <= width);
                prop_assert!(out.height >= 1 && out.height <= height);
                prop_assert!(out.width <= rect.width && out.height <= rect.height);
            }
        }

        /// Property: Each output pixel equals the source pixel at the offset position.
        #[test]
        fn prop_pixels_come_from_offset(
            (width, height) in dimensions_strategy(),
            rect in rect_strategy(),
        ) {
            let pixels = (0..width * height).map(|i| (i % 251) as u8).collect();
            let img = Bitmap::new(width, height, PixelFormat::Gray8, pixels);
            if let Some(out) = crop(&img, rect) {
                for y in 0..out.height {
                    for x in 0..out.width {
                        prop_assert_eq!(out.pixel(x, y), img.pixel(rect.x + x, rect.y + y));
                    }
                }
            }
        }
    }
}
