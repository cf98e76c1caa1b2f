//! Quarter-turn rotation and mirroring.
//!
//! Both operations are implemented as inverse mappings: for each pixel in
//! the output we compute the single source pixel it comes from and copy its
//! bytes. For a clockwise quarter turn of a `w × h` source:
//!
//! ```text
//! dst(x, y) = src(y, h - 1 - x)        1 turn   (output is h × w)
//! dst(x, y) = src(w - 1 - x, h - 1 - y) 2 turns
//! dst(x, y) = src(w - 1 - y, x)        3 turns  (output is h × w)
//! ```

use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;

/// Axis to flip a bitmap across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorAxis {
    /// Swap left and right.
    Horizontal,
    /// Swap top and bottom.
    Vertical,
}

/// Output dimensions after rotating a `width × height` bitmap.
#[inline]
pub fn rotated_dimensions(width: u32, height: u32, quarter_turns: u8) -> (u32, u32) {
    if quarter_turns % 2 == 1 {
        (height, width)
    } else {
        (width, height)
    }
}

/// Rotate a bitmap clockwise by `quarter_turns × 90°`.
///
/// Turns are taken mod 4; zero turns returns a copy.
pub fn rotate_quarter_turns(image: &Bitmap, quarter_turns: u8) -> Bitmap {
    let turns = quarter_turns % 4;
    if turns == 0 {
        return image.clone();
    }

    let (w, h) = (image.width, image.height);
    let (out_w, out_h) = rotated_dimensions(w, h, turns);
    let channels = image.format.channels();
    let mut output = Vec::with_capacity(image.pixels.len());

    for y in 0..out_h {
        for x in 0..out_w {
            let (sx, sy) = match turns {
                1 => (y, h - 1 - x),
                2 => (w - 1 - x, h - 1 - y),
                _ => (w - 1 - y, x),
            };
            output.extend_from_slice(image.pixel_bytes(sx, sy));
        }
    }

    debug_assert_eq!(output.len(), out_w as usize * out_h as usize * channels);
    Bitmap::new(out_w, out_h, image.format, output)
}

/// Flip a bitmap across the given axis.
pub fn mirror(image: &Bitmap, axis: MirrorAxis) -> Bitmap {
    let (w, h) = (image.width, image.height);
    let mut output = Vec::with_capacity(image.pixels.len());

    for y in 0..h {
        for x in 0..w {
            let (sx, sy) = match axis {
                MirrorAxis::Horizontal => (w - 1 - x, y),
                MirrorAxis::Vertical => (x, h - 1 - y),
            };
            output.extend_from_slice(image.pixel_bytes(sx, sy));
        }
    }

    Bitmap::new(w, h, image.format, output)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
