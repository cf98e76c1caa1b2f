//! Luminance calculation using ITU-R BT.709 coefficients.
//!
//! Used wherever color has to collapse to a single gray level: indexed images
//! converted to grayscale on load, and colors painted onto grayscale pages.

use crate::Color;

/// ITU-R BT.709 coefficient for red channel in luminance calculation.
pub const LUMINANCE_R: f32 = 0.2126;

/// ITU-R BT.709 coefficient for green channel in luminance calculation.
pub const LUMINANCE_G: f32 = 0.7152;

/// ITU-R BT.709 coefficient for blue channel in luminance calculation.
pub const LUMINANCE_B: f32 = 0.0722;

/// Calculate luminance from u8 RGB values (0 to 255).
#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    let lum = LUMINANCE_R * r as f32 + LUMINANCE_G * g as f32 + LUMINANCE_B * b as f32;
    lum.clamp(0.0, 255.0).round() as u8
}

/// Collapse a color palette to one gray level per entry.
///
/// The result is a lookup table indexed the same way as `palette`.
pub fn gray_palette(palette: &[Color]) -> Vec<u8> {
    palette.iter().map(|c| luma_u8(c.r, c.g, c.b)).collect()
}

/// Global threshold separating dark from light gray levels (Otsu's method).
///
/// Levels above the returned value count as light. A single-level input
/// returns 0.
pub fn otsu_threshold(levels: &[u8]) -> u8 {
    let mut histogram = [0u64; 256];
    for &v in levels {
        histogram[v as usize] += 1;
    }
    let total = levels.len() as f64;
    let sum: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &n)| i as f64 * n as f64)
        .sum();

    let (mut weight_dark, mut sum_dark) = (0.0, 0.0);
    let (mut best, mut best_variance) = (0u8, 0.0);
    for (t, &n) in histogram.iter().enumerate() {
        weight_dark += n as f64;
        if weight_dark == 0.0 {
            continue;
        }
        let weight_light = total - weight_dark;
        if weight_light == 0.0 {
            break;
        }
        sum_dark += t as f64 * n as f64;
        let mean_dark = sum_dark / weight_dark;
        let mean_light = (sum - sum_dark) / weight_light;
        let variance = weight_dark * weight_light * (mean_dark - mean_light).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best = t as u8;
        }
    }
    best
}
