//! The interactive canvas.
//!
//! [`CanvasView`] shows one page of a [`PageCollection`] through a
//! [`ViewTransform`] and turns pointer gestures into tool actions: selection
//! bands, area zoom, freehand strokes and fills. Every bitmap edit is
//! preceded by one snapshot on the canvas's [`EditStack`].
//!
//! The canvas never owns pages. It remembers the active page by identity and
//! index and looks it up in the collection passed to each call; a page that
//! has moved or disappeared is noticed by [`CanvasView::revalidate`].

mod gesture;
mod transform;

pub use gesture::{GestureState, PointerButton, PointerEvent, ToolMode};
pub use transform::{ViewMemo, ViewTransform, Viewport, ZoomBounds, MAX_AREA_SCALE_FACTOR};

use gesture::BandPurpose;

use crate::collection::PageCollection;
use crate::config::{snap_brush_size, EditorConfig};
use crate::draw::{fill_outside, fill_rect, stamp_dot, stroke_line};
use crate::error::EditError;
use crate::events::EditorEvent;
use crate::geometry::{PixelRect, Point, Rect};
use crate::history::EditStack;
use crate::page::{Page, PageId};
use crate::transform::crop;
use crate::Color;

/// Scale factor multiplier for one zoom-in step.
pub const ZOOM_IN_FACTOR: f64 = 1.25;
/// Scale factor multiplier for one zoom-out step.
pub const ZOOM_OUT_FACTOR: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActivePage {
    id: PageId,
    index: usize,
}

/// Viewport, tools and gesture state for the page being edited.
#[derive(Debug, Clone)]
pub struct CanvasView {
    view: ViewTransform,
    bounds: ZoomBounds,
    active: Option<ActivePage>,
    tool: ToolMode,
    gesture: GestureState,
    band_purpose: BandPurpose,
    origin: Point,
    /// Rubber band in view coordinates while one is dragged.
    band: Option<Rect>,
    /// Pending selection region in bitmap coordinates.
    selection: Option<PixelRect>,
    stroke_color: Color,
    foreground: Color,
    background: Color,
    default_colors: (Color, Color),
    brush_size: u32,
    history: EditStack,
    outbox: Vec<EditorEvent>,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl CanvasView {
    pub fn new(config: &EditorConfig) -> Self {
        let viewport = Viewport::new(
            config.viewport_width,
            config.viewport_height,
            config.scrollbar_extent,
        );
        Self {
            view: ViewTransform::new(viewport),
            bounds: ZoomBounds {
                min: config.min_zoom,
                max: config.max_zoom,
            },
            active: None,
            tool: ToolMode::default(),
            gesture: GestureState::Idle,
            band_purpose: BandPurpose::Select,
            origin: Point::default(),
            band: None,
            selection: None,
            stroke_color: config.foreground,
            foreground: config.foreground,
            background: config.background,
            default_colors: (config.foreground, config.background),
            brush_size: snap_brush_size(config.brush_size),
            history: EditStack::new(config.undo_depth),
            outbox: Vec::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn zoom_bounds(&self) -> ZoomBounds {
        self.bounds
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn gesture(&self) -> GestureState {
        self.gesture
    }

    /// The rubber band being dragged, in view coordinates.
    pub fn band(&self) -> Option<Rect> {
        self.band
    }

    /// The region the last pointer-mode band selected, in bitmap pixels.
    pub fn selection(&self) -> Option<PixelRect> {
        self.selection
    }

    pub fn foreground(&self) -> Color {
        self.foreground
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn history(&self) -> &EditStack {
        &self.history
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active.map(|a| a.index)
    }

    pub fn active_id(&self) -> Option<PageId> {
        self.active.map(|a| a.id)
    }

    pub fn can_zoom_in(&self) -> bool {
        self.bounds.can_zoom_in(self.view.scale_factor())
    }

    pub fn can_zoom_out(&self) -> bool {
        self.bounds.can_zoom_out(self.view.scale_factor())
    }

    /// Stroke width in bitmap pixels for the current brush and zoom.
    ///
    /// The brush is sized in view units, never thinner than one.
    pub fn stroke_width(&self) -> f64 {
        let view_width = (self.brush_size as f64 * self.view.effective_scale())
            .round()
            .max(1.0);
        view_width * self.view.inverse_scale()
    }

    /// Take the queued events.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ========================================================================
    // Tools and colors
    // ========================================================================

    /// Switch tools. A gesture in progress keeps the tool it started with.
    pub fn set_tool(&mut self, tool: ToolMode) {
        self.tool = tool;
    }

    /// Set the brush size, snapped to the nearest menu size not above it.
    pub fn set_brush_size(&mut self, size: u32) {
        self.brush_size = snap_brush_size(size);
    }

    pub fn set_colors(&mut self, foreground: Color, background: Color) {
        self.foreground = foreground;
        self.background = background;
    }

    pub fn swap_colors(&mut self) {
        std::mem::swap(&mut self.foreground, &mut self.background);
    }

    /// Back to the configured colors.
    pub fn reset_colors(&mut self) {
        (self.foreground, self.background) = self.default_colors;
    }

    // ========================================================================
    // Active page
    // ========================================================================

    fn active_page<'a>(&self, pages: &'a mut PageCollection) -> Option<(usize, &'a mut Page)> {
        let active = self.active?;
        pages
            .get_mut(active.index)
            .filter(|page| page.id() == active.id)
            .map(|page| (active.index, page))
    }

    /// Show the page at `index`, or nothing.
    ///
    /// The outgoing page keeps its view so it comes back the same way; a page
    /// shown for the first time is fitted to the window. Switching pages
    /// flushes the undo history.
    pub fn activate(&mut self, pages: &mut PageCollection, index: Option<usize>) {
        let target = index.and_then(|i| match pages.get(i) {
            Some(page) => Some(ActivePage { id: page.id(), index: i }),
            None => {
                log::warn!("cannot activate page {}: only {} pages", i, pages.len());
                None
            }
        });

        if let (Some(current), Some(next)) = (self.active, target) {
            if current.id == next.id {
                self.active = Some(next);
                return;
            }
        }

        self.cancel_gesture(pages);
        let memo = self.view.memo();
        if let Some((_, page)) = self.active_page(pages) {
            page.set_view(Some(memo));
        }
        self.history.flush();
        self.selection = None;
        self.active = target;

        match self.active_page(pages) {
            Some((_, page)) => {
                let (width, height) = page.bitmap().dimensions();
                let saved = page.view().copied();
                self.view.set_image_size(width, height);
                match saved {
                    Some(memo) if memo.scale_base != 0.0 => self.view.restore(&memo),
                    _ => self.view.fit_to_window(),
                }
            }
            None => self.view.set_image_size(0, 0),
        }

        log::debug!("active page is now {:?}", self.active_index());
        self.outbox.push(EditorEvent::ActivePageChanged {
            index: self.active_index(),
        });
        self.emit_view();
    }

    /// Re-find the active page after the collection changed shape.
    ///
    /// Follows the page to its new index, or clears the canvas when the page
    /// is gone.
    pub fn revalidate(&mut self, pages: &mut PageCollection) {
        let Some(active) = self.active else {
            return;
        };
        match pages.index_of(active.id) {
            Some(index) => {
                self.active = Some(ActivePage { index, ..active });
            }
            None => {
                log::debug!("active page {} was removed", active.id.get());
                self.gesture = GestureState::Idle;
                self.band = None;
                self.selection = None;
                self.history.flush();
                self.active = None;
                self.view.set_image_size(0, 0);
                self.outbox.push(EditorEvent::ActivePageChanged { index: None });
                self.emit_view();
            }
        }
    }

    /// The active page's bitmap was replaced behind the canvas's back, by a
    /// rotation or mirror. Snapshots no longer apply; refit to the new size.
    pub fn reload(&mut self, pages: &mut PageCollection) {
        self.gesture = GestureState::Idle;
        self.band = None;
        self.selection = None;
        self.history.flush();
        let Some((_, page)) = self.active_page(pages) else {
            return;
        };
        let (width, height) = page.bitmap().dimensions();
        self.view.set_image_size(width, height);
        self.view.fit_to_window();
        self.emit_view();
    }

    // ========================================================================
    // Pointer gestures
    // ========================================================================

    pub fn pointer_down(&mut self, pages: &mut PageCollection, event: PointerEvent) {
        if self.gesture != GestureState::Idle {
            log::debug!("pointer down ignored while {:?}", self.gesture);
            return;
        }
        let Some((_, page)) = self.active_page(pages) else {
            log::debug!("pointer down ignored: no active page");
            return;
        };

        self.origin = event.pos;
        match event.button {
            PointerButton::Secondary if event.shift => {
                self.gesture = GestureState::Panning;
            }
            PointerButton::Secondary => self.begin_band(BandPurpose::Zoom),
            PointerButton::Primary => match BandPurpose::for_tool(self.tool) {
                Some(purpose) => self.begin_band(purpose),
                None => {
                    self.stroke_color = match self.tool {
                        ToolMode::Erase => self.background,
                        _ => self.foreground,
                    };
                    self.history.push_snapshot(page.bitmap());
                    let center = self.stroke_point(event.pos);
                    stamp_dot(page.bitmap_mut(), center, self.stroke_width(), self.stroke_color);
                    self.gesture = GestureState::Drawing;
                }
            },
        }
        log::debug!("gesture {:?} started at {:?}", self.gesture, event.pos);
    }

    fn begin_band(&mut self, purpose: BandPurpose) {
        self.band_purpose = purpose;
        self.band = Some(Rect::from_points(self.origin, self.origin));
        if purpose == BandPurpose::Select {
            self.selection = None;
        }
        self.gesture = GestureState::RubberBanding;
    }

    pub fn pointer_move(&mut self, pages: &mut PageCollection, event: PointerEvent) {
        match self.gesture {
            GestureState::Idle => {}
            GestureState::RubberBanding => {
                self.band = Some(Rect::from_points(self.origin, event.pos));
            }
            GestureState::Drawing => {
                if let Some((_, page)) = self.active_page(pages) {
                    self.stroke_to(page, event.pos);
                }
            }
            GestureState::Panning => {
                // The origin stays put: positions are document-relative, so
                // the delta already includes earlier scrolling.
                let dx = event.pos.x - self.origin.x;
                let dy = event.pos.y - self.origin.y;
                self.view.pan_by(-dx, -dy);
                self.emit_view();
            }
        }
    }

    pub fn pointer_up(&mut self, pages: &mut PageCollection, event: PointerEvent) {
        match std::mem::take(&mut self.gesture) {
            GestureState::Idle => {}
            GestureState::RubberBanding => {
                self.band = None;
                let band = Rect::from_points(self.origin, event.pos);
                self.commit_band(pages, band);
            }
            GestureState::Drawing => {
                if let Some((index, page)) = self.active_page(pages) {
                    self.stroke_to(page, event.pos);
                    page.record_edit();
                    self.content_changed(pages, index);
                }
            }
            GestureState::Panning => {}
        }
    }

    /// Abandon the current gesture. A stroke in progress is rolled back.
    pub fn cancel_gesture(&mut self, pages: &mut PageCollection) {
        if std::mem::take(&mut self.gesture) == GestureState::Drawing {
            if let Some((_, page)) = self.active_page(pages) {
                self.history.revert(page.bitmap_mut());
            }
        }
        self.band = None;
    }

    fn stroke_to(&mut self, page: &mut Page, pos: Point) {
        let from = self.stroke_point(self.origin);
        let to = self.stroke_point(pos);
        stroke_line(page.bitmap_mut(), from, to, self.stroke_width(), self.stroke_color);
        self.origin = pos;
    }

    /// Pointer positions address view pixels; strokes go through the
    /// pixel's center.
    fn stroke_point(&self, pos: Point) -> Point {
        self.view.to_bitmap(Point::new(pos.x + 0.5, pos.y + 0.5))
    }

    fn commit_band(&mut self, pages: &mut PageCollection, band: Rect) {
        match self.band_purpose {
            BandPurpose::Zoom => {
                if self.view.zoom_area(band) {
                    self.emit_view();
                } else {
                    log::debug!("zoom band ignored: zero area");
                }
            }
            BandPurpose::Select => {
                self.selection = self.band_to_pixels(pages, band);
            }
            BandPurpose::Fill => {
                let Some(rect) = self.band_to_pixels(pages, band) else {
                    log::debug!("fill band ignored: zero area");
                    return;
                };
                if let Some((index, page)) = self.active_page(pages) {
                    self.history.push_snapshot(page.bitmap());
                    fill_rect(page.bitmap_mut(), rect, self.background);
                    page.record_edit();
                    self.content_changed(pages, index);
                }
            }
        }
    }

    fn band_to_pixels(&self, pages: &mut PageCollection, band: Rect) -> Option<PixelRect> {
        if band.is_empty() {
            return None;
        }
        let (_, page) = self.active_page(pages)?;
        let (width, height) = page.bitmap().dimensions();
        self.view.rect_to_bitmap(band).to_pixels(width, height)
    }

    // ========================================================================
    // Selection-region edits
    // ========================================================================

    /// Fill the pending selection with the background color, or everything
    /// outside it when `outside` is set.
    pub fn fill_selection(
        &mut self,
        pages: &mut PageCollection,
        outside: bool,
    ) -> Result<(), EditError> {
        let (index, page) = self.active_page(pages).ok_or(EditError::NoActivePage)?;
        let rect = self.selection.ok_or(EditError::EmptyGeometry)?;

        self.history.push_snapshot(page.bitmap());
        if outside {
            fill_outside(page.bitmap_mut(), rect, self.background);
        } else {
            fill_rect(page.bitmap_mut(), rect, self.background);
        }
        page.record_edit();
        self.content_changed(pages, index);
        Ok(())
    }

    /// Crop the page to the pending selection and refit.
    pub fn crop_to_selection(&mut self, pages: &mut PageCollection) -> Result<(), EditError> {
        let (index, page) = self.active_page(pages).ok_or(EditError::NoActivePage)?;
        let rect = self.selection.ok_or(EditError::EmptyGeometry)?;
        let cropped = crop(page.bitmap(), rect).ok_or(EditError::EmptyGeometry)?;

        self.history.push_snapshot(page.bitmap());
        let (width, height) = cropped.dimensions();
        page.set_bitmap(cropped);
        page.record_edit();
        self.selection = None;

        self.view.set_image_size(width, height);
        self.view.fit_to_window();
        self.content_changed(pages, index);
        self.emit_view();
        Ok(())
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    /// Restore the page to before the last edit. `Ok(false)` when there is
    /// nothing to undo.
    pub fn undo(&mut self, pages: &mut PageCollection) -> Result<bool, EditError> {
        self.step_history(pages, true)
    }

    /// Re-apply the last undone edit. `Ok(false)` when there is nothing to
    /// redo.
    pub fn redo(&mut self, pages: &mut PageCollection) -> Result<bool, EditError> {
        self.step_history(pages, false)
    }

    fn step_history(&mut self, pages: &mut PageCollection, back: bool) -> Result<bool, EditError> {
        if self.gesture != GestureState::Idle {
            log::debug!("history step ignored while {:?}", self.gesture);
            return Ok(false);
        }
        let (index, page) = self.active_page(pages).ok_or(EditError::NoActivePage)?;

        let before = page.bitmap().dimensions();
        let stepped = if back {
            self.history.undo(page.bitmap_mut())
        } else {
            self.history.redo(page.bitmap_mut())
        };
        if !stepped {
            log::debug!("nothing to {}", if back { "undo" } else { "redo" });
            return Ok(false);
        }
        if back {
            page.revert_edit();
        } else {
            page.record_edit();
        }

        let after = page.bitmap().dimensions();
        let resized = before != after;
        if resized {
            self.selection = None;
            self.view.set_image_size(after.0, after.1);
            self.view.fit_to_window();
        }
        self.content_changed(pages, index);
        if resized {
            self.emit_view();
        }
        Ok(true)
    }

    // ========================================================================
    // Zoom and scroll
    // ========================================================================

    pub fn zoom_in(&mut self) {
        self.apply_view(|view| view.zoom_by(ZOOM_IN_FACTOR));
    }

    pub fn zoom_out(&mut self) {
        self.apply_view(|view| view.zoom_by(ZOOM_OUT_FACTOR));
    }

    /// Wheel zoom around `pos` (view coordinates).
    pub fn zoom_at(&mut self, pos: Point, factor: f64) {
        self.apply_view(|view| view.zoom_at(pos, factor));
    }

    /// Zoom into `rect` (view coordinates).
    pub fn zoom_area(&mut self, rect: Rect) -> Result<(), EditError> {
        if self.active.is_none() {
            return Err(EditError::NoActivePage);
        }
        if !self.view.zoom_area(rect) {
            return Err(EditError::EmptyGeometry);
        }
        self.emit_view();
        Ok(())
    }

    pub fn fit_to_window(&mut self) {
        self.apply_view(ViewTransform::fit_to_window);
    }

    pub fn fit_width(&mut self) {
        self.apply_view(ViewTransform::fit_width);
    }

    pub fn fit_height(&mut self) {
        self.apply_view(ViewTransform::fit_height);
    }

    pub fn fill_window(&mut self) {
        self.apply_view(ViewTransform::fill_window);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.apply_view(|view| view.pan_by(dx, dy));
    }

    /// The host widget was resized. Applies even with no page shown.
    pub fn set_viewport(&mut self, width: f64, height: f64) {
        let extent = self.view.viewport().scrollbar_extent;
        self.view.set_viewport(Viewport::new(width, height, extent));
        if self.active.is_some() {
            self.emit_view();
        }
    }

    fn apply_view(&mut self, op: impl FnOnce(&mut ViewTransform)) {
        if self.active.is_none() {
            log::debug!("view change ignored: no active page");
            return;
        }
        op(&mut self.view);
        self.emit_view();
    }

    // ========================================================================
    // Events
    // ========================================================================

    fn emit_view(&mut self) {
        let scale_factor = self.view.scale_factor();
        let scroll = self.view.scroll();
        self.outbox.push(EditorEvent::ViewChanged {
            scale_factor,
            effective_scale: self.view.effective_scale(),
            scroll_x: scroll.x,
            scroll_y: scroll.y,
            can_zoom_in: self.bounds.can_zoom_in(scale_factor),
            can_zoom_out: self.bounds.can_zoom_out(scale_factor),
        });
    }

    fn content_changed(&mut self, pages: &mut PageCollection, index: usize) {
        pages.refresh_thumbnail(index);
        self.outbox.push(EditorEvent::ContentChanged { index });
    }
}
