//! Points and rectangles in view and bitmap space.
//!
//! View-space coordinates come from pointer events and are scaled by the
//! canvas's effective scale; bitmap-space coordinates address pixels, with
//! pixel `(x, y)` covering `[x, x + 1) × [y, y + 1)`.

use serde::{Deserialize, Serialize};

/// A point in continuous 2D space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Multiply both coordinates by `s`.
    pub fn scaled(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

/// An axis-aligned rectangle with non-negative extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The normalized box spanned by two corner points, in any order.
    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// True when the rectangle has zero width or zero height.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Scale position and extent uniformly about the origin.
    pub fn scaled(&self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.width * s, self.height * s)
    }

    /// The whole pixels covered by this rectangle, clipped to a
    /// `width × height` bitmap.
    ///
    /// A pixel is covered when its center lies inside the rectangle. Returns
    /// `None` when nothing is covered.
    pub fn to_pixels(&self, width: u32, height: u32) -> Option<PixelRect> {
        let clip = |lo: f64, hi: f64, max: u32| -> (u32, u32) {
            let lo = lo.round().clamp(0.0, max as f64) as u32;
            let hi = hi.round().clamp(0.0, max as f64) as u32;
            (lo, hi)
        };
        let (x0, x1) = clip(self.x, self.right(), width);
        let (y0, y1) = clip(self.y, self.bottom(), height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(PixelRect::new(x0, y0, x1 - x0, y1 - y0))
    }
}

/// A rectangle of whole pixels inside a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}
