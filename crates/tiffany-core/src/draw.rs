//! Raster primitives used by the canvas tools.
//!
//! Coordinates are in bitmap space. A pixel `(x, y)` is painted when its
//! center `(x + 0.5, y + 0.5)` lies within the shape, so strokes get round
//! caps and joins for free.

use crate::bitmap::Bitmap;
use crate::geometry::{PixelRect, Point};
use crate::Color;

/// Fill a rectangle of pixels with `color`.
pub fn fill_rect(image: &mut Bitmap, rect: PixelRect, color: Color) {
    let right = rect.right().min(image.width);
    let bottom = rect.bottom().min(image.height);
    for y in rect.y..bottom {
        for x in rect.x..right {
            image.set_pixel(x, y, color);
        }
    }
}

/// Fill every pixel that is *not* inside `rect`.
pub fn fill_outside(image: &mut Bitmap, rect: PixelRect, color: Color) {
    for y in 0..image.height {
        for x in 0..image.width {
            if !rect.contains(x, y) {
                image.set_pixel(x, y, color);
            }
        }
    }
}

/// Paint a filled disc of diameter `width` centered on `center`.
pub fn stamp_dot(image: &mut Bitmap, center: Point, width: f64, color: Color) {
    stroke_line(image, center, center, width, color);
}

/// Paint a segment of the given stroke width with round caps.
///
/// Widths below one pixel still paint the pixels the segment passes through.
pub fn stroke_line(image: &mut Bitmap, from: Point, to: Point, width: f64, color: Color) {
    if image.is_empty() {
        return;
    }
    let radius = (width / 2.0).max(0.5);

    // Bounding box of the stroke, clipped to the bitmap
    let min_x = (from.x.min(to.x) - radius).floor().max(0.0);
    let min_y = (from.y.min(to.y) - radius).floor().max(0.0);
    let max_x = (from.x.max(to.x) + radius).ceil().min(image.width as f64);
    let max_y = (from.y.max(to.y) + radius).ceil().min(image.height as f64);
    if max_x <= min_x || max_y <= min_y {
        return;
    }

    let (x0, x1) = (min_x as u32, max_x as u32);
    let (y0, y1) = (min_y as u32, max_y as u32);
    let r2 = radius * radius;
    for y in y0..y1 {
        for x in x0..x1 {
            let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if distance_sq_to_segment(p, from, to) <= r2 {
                image.set_pixel(x, y, color);
            }
        }
    }

    // A thin disc can fall between pixel centers
    paint_containing(image, from, color);
    paint_containing(image, to, color);
}

/// Paint the pixel that contains `p`, if any.
fn paint_containing(image: &mut Bitmap, p: Point, color: Color) {
    if p.x >= 0.0 && p.y >= 0.0 {
        image.set_pixel(p.x as u32, p.y as u32, color);
    }
}

/// Squared distance from `p` to the segment `a`-`b`.
fn distance_sq_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.x + t * dx - p.x, a.y + t * dy - p.y);
    cx * cx + cy * cy
}
