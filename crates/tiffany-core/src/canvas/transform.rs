//! Zoom, fit and scroll mathematics for the canvas.
//!
//! The canvas shows the page bitmap uniformly scaled by the effective scale
//! `scale_factor × scale_base`, inside a viewport with scrollbars. View
//! coordinates are positions on the scaled document, with the origin at the
//! top-left of the page; scroll offsets say which part of the document is
//! visible.
//!
//! Scrollbars follow the usual scroll-area rules: a bar appears when the
//! document is larger than the viewport along its axis, and takes
//! `scrollbar_extent` away from the other axis while visible.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Scale factors above this are clamped by area zoom.
pub const MAX_AREA_SCALE_FACTOR: f64 = 10_000.0;

/// The visible widget area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Thickness of a scrollbar in view units.
    pub scrollbar_extent: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, scrollbar_extent: f64) -> Self {
        Self {
            width,
            height,
            scrollbar_extent,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0, 16.0)
    }
}

/// Scale factor limits for enabling the zoom actions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self { min: 0.1, max: 10.0 }
    }
}

impl ZoomBounds {
    pub fn can_zoom_in(&self, scale_factor: f64) -> bool {
        scale_factor < self.max
    }

    pub fn can_zoom_out(&self, scale_factor: f64) -> bool {
        scale_factor > self.min
    }
}

/// The part of a view worth restoring when a page is shown again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewMemo {
    pub scale_factor: f64,
    pub scale_base: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

/// Scale and scroll state of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    scale_factor: f64,
    scale_base: f64,
    /// `1 / (scale_factor × scale_base)`, refreshed only when a scale changes.
    inverse: f64,
    scroll: Point,
    viewport: Viewport,
    image_width: f64,
    image_height: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl ViewTransform {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            scale_factor: 1.0,
            scale_base: 1.0,
            inverse: 1.0,
            scroll: Point::default(),
            viewport,
            image_width: 0.0,
            image_height: 0.0,
        }
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn scale_base(&self) -> f64 {
        self.scale_base
    }

    /// `scale_factor × scale_base`.
    pub fn effective_scale(&self) -> f64 {
        self.scale_factor * self.scale_base
    }

    /// The cached view-to-bitmap scale.
    pub fn inverse_scale(&self) -> f64 {
        self.inverse
    }

    pub fn scroll(&self) -> Point {
        self.scroll
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Bitmap dimensions the transform is laid out for.
    pub fn image_size(&self) -> (f64, f64) {
        (self.image_width, self.image_height)
    }

    fn set_scales(&mut self, scale_factor: f64, scale_base: f64) {
        if scale_factor == self.scale_factor && scale_base == self.scale_base {
            return;
        }
        self.scale_factor = scale_factor;
        self.scale_base = scale_base;
        let effective = self.effective_scale();
        self.inverse = if effective > 0.0 { 1.0 / effective } else { 0.0 };
    }

    /// Map a view position into bitmap space.
    pub fn to_bitmap(&self, p: Point) -> Point {
        p.scaled(self.inverse)
    }

    /// Map a view rectangle into bitmap space.
    pub fn rect_to_bitmap(&self, r: Rect) -> Rect {
        r.scaled(self.inverse)
    }

    /// Map a bitmap position into view space.
    pub fn to_view(&self, p: Point) -> Point {
        p.scaled(self.effective_scale())
    }

    pub fn set_image_size(&mut self, width: u32, height: u32) {
        self.image_width = width as f64;
        self.image_height = height as f64;
        self.clamp_scroll();
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.clamp_scroll();
    }

    /// Size of the scaled page.
    pub fn document_size(&self) -> (f64, f64) {
        let s = self.effective_scale();
        (self.image_width * s, self.image_height * s)
    }

    /// The viewport area left for the document after scrollbars.
    pub fn visible_size(&self) -> (f64, f64) {
        let (doc_w, doc_h) = self.document_size();
        let ext = self.viewport.scrollbar_extent;
        let (mut w, mut h) = (self.viewport.width, self.viewport.height);

        // One bar can leave too little room for the other axis
        let h_first = doc_w > w;
        let v_first = doc_h > h;
        let h_bar = h_first || (v_first && doc_w > w - ext);
        let v_bar = v_first || (h_first && doc_h > h - ext);
        if h_bar {
            h -= ext;
        }
        if v_bar {
            w -= ext;
        }
        (w.max(0.0), h.max(0.0))
    }

    /// Largest scroll offsets along each axis.
    pub fn scroll_max(&self) -> (f64, f64) {
        let (doc_w, doc_h) = self.document_size();
        let (vis_w, vis_h) = self.visible_size();
        ((doc_w - vis_w).max(0.0), (doc_h - vis_h).max(0.0))
    }

    fn clamp_scroll(&mut self) {
        let (max_x, max_y) = self.scroll_max();
        self.scroll = Point::new(
            self.scroll.x.clamp(0.0, max_x),
            self.scroll.y.clamp(0.0, max_y),
        );
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
        self.clamp_scroll();
    }

    /// Multiply the scale factor by `factor`, keeping the viewport center
    /// over the same part of the page.
    pub fn zoom_by(&mut self, factor: f64) {
        let (page_w, page_h) = self.visible_size();
        let before = self.scroll;
        self.set_scales(self.scale_factor * factor, self.scale_base);
        self.set_scroll(Point::new(
            factor * before.x + (factor - 1.0) * page_w / 2.0,
            factor * before.y + (factor - 1.0) * page_h / 2.0,
        ));
    }

    /// Multiply the scale factor by `factor`, keeping the page point under
    /// `pos` (view coordinates) stationary on screen.
    pub fn zoom_at(&mut self, pos: Point, factor: f64) {
        let before = self.scroll;
        self.set_scales(self.scale_factor * factor, self.scale_base);
        self.set_scroll(Point::new(
            before.x + (factor - 1.0) * pos.x,
            before.y + (factor - 1.0) * pos.y,
        ));
    }

    /// Zoom so `rect` (view coordinates) fills the viewport along its
    /// limiting dimension, then center on it.
    ///
    /// Returns `false` and changes nothing for a zero-area rectangle.
    pub fn zoom_area(&mut self, rect: Rect) -> bool {
        if rect.is_empty() {
            return false;
        }
        let (doc_w, doc_h) = self.document_size();
        if doc_w <= 0.0 || doc_h <= 0.0 {
            return false;
        }

        // Center of the band as a fraction of the document
        let center = rect.center();
        let (cx, cy) = (center.x / doc_w, center.y / doc_h);

        // Viewport with both scrollbars shown
        let ext = self.viewport.scrollbar_extent;
        let view_w = (self.viewport.width - ext).max(1.0);
        let view_h = (self.viewport.height - ext).max(1.0);

        let factor = if rect.width * view_h > rect.height * view_w {
            view_w / rect.width
        } else {
            view_h / rect.height
        };
        let scale_factor = (self.scale_factor * factor).min(MAX_AREA_SCALE_FACTOR);
        self.set_scales(scale_factor, self.scale_base);

        let (max_x, max_y) = self.scroll_max();
        let (page_w, page_h) = self.visible_size();
        self.set_scroll(Point::new(
            cx * max_x + (cx - 0.5) * page_w,
            cy * max_y + (cy - 0.5) * page_h,
        ));
        true
    }

    /// True when the full viewport is relatively wider than the image.
    fn view_is_wider(&self) -> bool {
        self.viewport.width * self.image_height > self.viewport.height * self.image_width
    }

    fn has_image(&self) -> bool {
        self.image_width > 0.0 && self.image_height > 0.0
    }

    fn fit(&mut self, scale_base: f64) {
        self.set_scales(1.0, scale_base);
        self.clamp_scroll();
    }

    /// Show the whole page with no scrollbars.
    pub fn fit_to_window(&mut self) {
        if !self.has_image() {
            return;
        }
        let Viewport { width, height, .. } = self.viewport;
        let base = if self.view_is_wider() {
            height / self.image_height
        } else {
            width / self.image_width
        };
        self.fit(base);
    }

    /// Fill the viewport width. When the page will then scroll vertically,
    /// leave room for the vertical scrollbar.
    pub fn fit_width(&mut self) {
        if !self.has_image() {
            return;
        }
        let Viewport {
            width,
            scrollbar_extent,
            ..
        } = self.viewport;
        let base = if self.view_is_wider() {
            (width - scrollbar_extent) / self.image_width
        } else {
            width / self.image_width
        };
        self.fit(base);
    }

    /// Fill the viewport height. When the page will then scroll
    /// horizontally, leave room for the horizontal scrollbar.
    pub fn fit_height(&mut self) {
        if !self.has_image() {
            return;
        }
        let Viewport {
            height,
            scrollbar_extent,
            ..
        } = self.viewport;
        let base = if self.view_is_wider() {
            height / self.image_height
        } else {
            (height - scrollbar_extent) / self.image_height
        };
        self.fit(base);
    }

    /// Fill the viewport with at most one scrollbar.
    pub fn fill_window(&mut self) {
        if self.view_is_wider() {
            self.fit_width();
        } else {
            self.fit_height();
        }
    }

    /// Scroll by a view-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let s = self.scroll;
        self.set_scroll(Point::new(s.x + dx, s.y + dy));
    }

    pub fn memo(&self) -> ViewMemo {
        ViewMemo {
            scale_factor: self.scale_factor,
            scale_base: self.scale_base,
            scroll_x: self.scroll.x,
            scroll_y: self.scroll.y,
        }
    }

    pub fn restore(&mut self, memo: &ViewMemo) {
        self.set_scales(memo.scale_factor, memo.scale_base);
        self.set_scroll(Point::new(memo.scroll_x, memo.scroll_y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn transform(view_w: f64, view_h: f64, img_w: u32, img_h: u32) -> ViewTransform {
        let mut t = ViewTransform::new(Viewport::new(view_w, view_h, 10.0));
        t.set_image_size(img_w, img_h);
        t
    }

    #[test]
    fn test_zoom_in_out_restores_factor() {
        let mut t = transform(800.0, 600.0, 1000, 1000);
        t.zoom_by(1.25);
        t.zoom_by(0.8);
        assert_eq!(t.scale_factor(), 1.0);
    }

    #[test]
    fn test_inverse_is_refreshed_on_scale_change() {
        let mut t = transform(800.0, 600.0, 1000, 1000);
        assert_eq!(t.inverse_scale(), 1.0);
        t.zoom_by(2.0);
        assert!(approx_eq(t.inverse_scale(), 0.5));
        assert_eq!(t.to_bitmap(Point::new(100.0, 50.0)), Point::new(50.0, 25.0));

        t.fit_to_window();
        assert!(approx_eq(t.inverse_scale(), 1.0 / t.effective_scale()));
    }

    #[test]
    fn test_fit_to_window_wide_view() {
        // View 800x600 relatively wider than a 100x200 image: height governs
        let mut t = transform(800.0, 600.0, 100, 200);
        t.zoom_by(3.0);
        t.fit_to_window();
        assert_eq!(t.scale_factor(), 1.0);
        assert!(approx_eq(t.scale_base(), 3.0));
        assert_eq!(t.scroll_max(), (0.0, 0.0));
    }

    #[test]
    fn test_fit_to_window_tall_view() {
        // View 400x800 relatively taller than a 400x400 image: width governs
        let mut t = transform(400.0, 800.0, 400, 400);
        t.fit_to_window();
        assert!(approx_eq(t.scale_base(), 1.0));
    }

    #[test]
    fn test_fit_width_reserves_scrollbar() {
        // Portrait page in a wide view: fitting width scrolls vertically
        let mut t = transform(800.0, 600.0, 400, 1000);
        t.fit_width();
        assert!(approx_eq(t.scale_base(), 790.0 / 400.0));
        let (vis_w, _) = t.visible_size();
        let (doc_w, _) = t.document_size();
        assert!(approx_eq(vis_w, doc_w));
        assert!(t.scroll_max().0 < EPSILON);
    }

    #[test]
    fn test_fit_width_no_reserve_when_page_fits() {
        // Landscape page in a tall view: no scrollbar, use the full width
        let mut t = transform(400.0, 800.0, 800, 400);
        t.fit_width();
        assert!(approx_eq(t.scale_base(), 0.5));
    }

    #[test]
    fn test_fit_height_reserves_scrollbar() {
        // Landscape page in a tall view: fitting height scrolls horizontally
        let mut t = transform(400.0, 800.0, 1000, 400);
        t.fit_height();
        assert!(approx_eq(t.scale_base(), 790.0 / 400.0));
        assert!(t.scroll_max().1 < EPSILON);
    }

    #[test]
    fn test_fill_window_picks_axis() {
        let mut wide = transform(800.0, 600.0, 400, 1000);
        wide.fill_window();
        assert!(approx_eq(wide.scale_base(), 790.0 / 400.0));

        let mut tall = transform(400.0, 800.0, 1000, 400);
        tall.fill_window();
        assert!(approx_eq(tall.scale_base(), 790.0 / 400.0));
    }

    #[test]
    fn test_zoom_area_width_limited() {
        // Viewport with bars: 790x590. A 100x10 band is width-limited.
        let mut t = transform(800.0, 600.0, 800, 600);
        assert!(t.zoom_area(Rect::new(0.0, 0.0, 100.0, 10.0)));
        assert!(approx_eq(t.scale_factor(), 7.9));
    }

    #[test]
    fn test_zoom_area_height_limited() {
        let mut t = transform(800.0, 600.0, 800, 600);
        assert!(t.zoom_area(Rect::new(0.0, 0.0, 10.0, 59.0)));
        assert!(approx_eq(t.scale_factor(), 10.0));
    }

    #[test]
    fn test_zoom_area_centers_band() {
        let mut t = transform(800.0, 600.0, 800, 600);
        let band = Rect::new(300.0, 200.0, 79.0, 59.0);
        assert!(t.zoom_area(band));
        // The band center lands in the middle of the visible area
        let center = band.center().scaled(t.scale_factor());
        let (vis_w, vis_h) = t.visible_size();
        assert!((center.x - t.scroll().x - vis_w / 2.0).abs() < 1e-6);
        assert!((center.y - t.scroll().y - vis_h / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_area_rejects_empty() {
        let mut t = transform(800.0, 600.0, 800, 600);
        assert!(!t.zoom_area(Rect::new(10.0, 10.0, 0.0, 50.0)));
        assert_eq!(t.scale_factor(), 1.0);
    }

    #[test]
    fn test_zoom_area_caps_scale_factor() {
        let mut t = transform(800.0, 600.0, 800, 600);
        assert!(t.zoom_area(Rect::new(0.0, 0.0, 0.001, 0.001)));
        assert_eq!(t.scale_factor(), MAX_AREA_SCALE_FACTOR);
    }

    #[test]
    fn test_zoom_at_keeps_point_stationary() {
        let mut t = transform(400.0, 300.0, 1000, 1000);
        t.set_scroll(Point::new(100.0, 100.0));
        let pos = Point::new(250.0, 200.0);
        let on_screen_before = Point::new(pos.x - t.scroll().x, pos.y - t.scroll().y);

        t.zoom_at(pos, 1.25);
        let moved = pos.scaled(1.25);
        let on_screen_after = Point::new(moved.x - t.scroll().x, moved.y - t.scroll().y);
        assert!(approx_eq(on_screen_before.x, on_screen_after.x));
        assert!(approx_eq(on_screen_before.y, on_screen_after.y));
    }

    #[test]
    fn test_zoom_by_keeps_center() {
        let mut t = transform(400.0, 300.0, 1000, 1000);
        t.set_scroll(Point::new(200.0, 200.0));
        let (vis_w, vis_h) = t.visible_size();
        let center_before = Point::new(200.0 + vis_w / 2.0, 200.0 + vis_h / 2.0);

        t.zoom_by(2.0);
        let (vis_w, vis_h) = t.visible_size();
        let center_after = Point::new(t.scroll().x + vis_w / 2.0, t.scroll().y + vis_h / 2.0);
        assert!(approx_eq(center_after.x, center_before.x * 2.0));
        assert!(approx_eq(center_after.y, center_before.y * 2.0));
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut t = transform(400.0, 300.0, 1000, 1000);
        t.pan_by(-50.0, 10_000.0);
        let (_, max_y) = t.scroll_max();
        assert_eq!(t.scroll(), Point::new(0.0, max_y));
    }

    #[test]
    fn test_visible_size_accounts_for_bars() {
        let t = transform(400.0, 300.0, 1000, 100);
        // Only a horizontal bar
        assert_eq!(t.visible_size(), (400.0, 290.0));

        let t = transform(400.0, 300.0, 1000, 1000);
        assert_eq!(t.visible_size(), (390.0, 290.0));

        let t = transform(400.0, 300.0, 100, 100);
        assert_eq!(t.visible_size(), (400.0, 300.0));
    }

    #[test]
    fn test_memo_round_trip() {
        let mut t = transform(400.0, 300.0, 1000, 1000);
        t.zoom_by(1.25);
        t.set_scroll(Point::new(30.0, 40.0));
        let memo = t.memo();

        let mut other = transform(400.0, 300.0, 1000, 1000);
        other.restore(&memo);
        assert_eq!(other.memo(), memo);
        assert_eq!(other.inverse_scale(), t.inverse_scale());
    }

    #[test]
    fn test_zoom_bounds() {
        let bounds = ZoomBounds::default();
        assert!(bounds.can_zoom_in(9.9));
        assert!(!bounds.can_zoom_in(10.0));
        assert!(bounds.can_zoom_out(0.2));
        assert!(!bounds.can_zoom_out(0.1));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum ViewOp {
        Zoom(f64),
        Area(Rect),
        Pan(f64, f64),
    }

    fn op_strategy() -> impl Strategy<Value = ViewOp> {
        prop_oneof![
            prop_oneof![Just(1.25), Just(0.8)].prop_map(ViewOp::Zoom),
            (0.0f64..2000.0, 0.0f64..2000.0, 0.01f64..400.0, 0.01f64..400.0)
                .prop_map(|(x, y, w, h)| ViewOp::Area(Rect::new(x, y, w, h))),
            (-500.0f64..500.0, -500.0f64..500.0).prop_map(|(dx, dy)| ViewOp::Pan(dx, dy)),
        ]
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    proptest! {
        /// Property: After any sequence of zooms and pans the cached inverse
        /// matches the scales and view/bitmap mapping round-trips.
        #[test]
        fn prop_view_ops_keep_transform_consistent(
            img_w in 1u32..3000,
            img_h in 1u32..3000,
            ops in proptest::collection::vec(op_strategy(), 1..30),
            px in 0.0f64..1000.0,
            py in 0.0f64..1000.0,
        ) {
            let mut t = ViewTransform::new(Viewport::default());
            t.set_image_size(img_w, img_h);
            t.fit_to_window();

            for op in ops {
                match op {
                    ViewOp::Zoom(factor) => t.zoom_by(factor),
                    ViewOp::Area(rect) => {
                        if t.zoom_area(rect) {
                            prop_assert!(t.scale_factor() <= MAX_AREA_SCALE_FACTOR);
                        }
                    }
                    ViewOp::Pan(dx, dy) => t.pan_by(dx, dy),
                }

                let scale = t.effective_scale();
                prop_assert!(scale.is_finite() && scale > 0.0);
                prop_assert!(close(t.inverse_scale() * scale, 1.0));

                let p = Point::new(px, py);
                let back = t.to_bitmap(t.to_view(p));
                prop_assert!(close(back.x, p.x) && close(back.y, p.y));

                let (max_x, max_y) = t.scroll_max();
                let s = t.scroll();
                prop_assert!(s.x >= 0.0 && s.x <= max_x);
                prop_assert!(s.y >= 0.0 && s.y <= max_y);
            }
        }
    }
}
