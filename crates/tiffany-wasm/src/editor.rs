//! The page editor exposed to JavaScript.
//!
//! [`JsPageEditor`] wraps one core [`Session`]. Browsers have no filesystem
//! the core could read from, so the host stages each file's bytes under a
//! name with `stage_file` and then loads by name. Editor events queue up
//! inside the editor until JavaScript collects them with `drain_events`,
//! typically once per animation frame.
//!
//! # Example
//!
//! ```typescript
//! import { JsPageEditor } from '@tiffany/wasm';
//!
//! const editor = new JsPageEditor();
//! for (const file of files) {
//!   editor.stage_file(file.name, new Uint8Array(await file.arrayBuffer()));
//! }
//! editor.load(files.map(f => f.name), 'append', new Uint32Array());
//! for (const event of editor.drain_events()) {
//!   if (event.kind === 'content_changed') redrawThumbnail(event.index);
//! }
//! ```

use std::sync::mpsc::{channel, Receiver, Sender};

use serde::Serialize;
use tiffany_core::canvas::GestureState;
use tiffany_core::decode::{DecodeError, Decoder, MemoryDecoder, SourceImage};
use tiffany_core::events::{ProgressSink, ProgressUpdate};
use tiffany_core::{
    EditorConfig, EditorEvent, LoadMode, LoadReport, PixelRect, Point, PointerEvent, Rect, Session,
    ToolMode,
};
use wasm_bindgen::prelude::*;

use crate::types::{
    button_from_u8, color_from_str, format_name, load_mode_from_str, mirror_from_str,
    rotate_from_str, tool_from_str, JsBitmap,
};

fn to_js<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Decoder over files staged from JavaScript.
///
/// Staged bytes arrive through a channel so the editor can keep staging
/// while the session owns the decoder.
struct StagedDecoder {
    incoming: Receiver<(String, Vec<u8>)>,
    files: MemoryDecoder,
}

impl Decoder for StagedDecoder {
    fn decode(&mut self, path: &str) -> Result<SourceImage, DecodeError> {
        for (name, bytes) in self.incoming.try_iter() {
            self.files.insert(name, bytes);
        }
        self.files.decode(path)
    }
}

/// Forwards progress updates to a JavaScript callback.
struct JsProgress(js_sys::Function);

impl JsProgress {
    fn send(&self, update: ProgressUpdate) {
        let value = match serde_wasm_bindgen::to_value(&update) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("could not convert progress update: {}", e);
                return;
            }
        };
        if let Err(e) = self.0.call1(&JsValue::NULL, &value) {
            log::warn!("progress callback failed: {:?}", e);
        }
    }
}

impl ProgressSink for JsProgress {
    fn begin(&mut self, label: &str, total: usize) {
        self.send(ProgressUpdate::Begin {
            label: label.to_string(),
            total,
        });
    }

    fn step(&mut self, done: usize) {
        self.send(ProgressUpdate::Step { done });
    }

    fn end(&mut self) {
        self.send(ProgressUpdate::End);
    }
}

/// Metadata for one page of the list.
#[derive(Debug, Serialize)]
struct PageInfo<'a> {
    label: usize,
    display_name: &'a str,
    source_path: &'a str,
    rotation: u8,
    change_count: u32,
    modified: bool,
    width: u32,
    height: u32,
    format: &'static str,
}

/// Everything the host needs to draw the canvas chrome.
#[derive(Debug, Serialize)]
struct ViewState {
    scale_factor: f64,
    effective_scale: f64,
    scroll_x: f64,
    scroll_y: f64,
    document_width: f64,
    document_height: f64,
    visible_width: f64,
    visible_height: f64,
    tool: ToolMode,
    gesture: GestureState,
    band: Option<Rect>,
    selection: Option<PixelRect>,
    brush_size: u32,
    foreground: String,
    background: String,
    can_zoom_in: bool,
    can_zoom_out: bool,
    can_undo: bool,
    can_redo: bool,
}

/// A page editing session for JavaScript.
#[wasm_bindgen]
pub struct JsPageEditor {
    session: Session,
    staging: Sender<(String, Vec<u8>)>,
    events: Receiver<EditorEvent>,
}

#[wasm_bindgen]
impl JsPageEditor {
    /// Create an editor, optionally from a JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<JsPageEditor, JsValue> {
        Self::from_config(config_json.as_deref()).map_err(to_js)
    }

    /// Report load and batch progress to `callback`, called with
    /// `{ kind: 'begin', label, total }`, `{ kind: 'step', done }` and
    /// `{ kind: 'end' }`.
    pub fn set_progress_callback(&mut self, callback: js_sys::Function) {
        self.session.set_progress(Box::new(JsProgress(callback)));
    }

    /// The active configuration as JSON.
    pub fn config_json(&self) -> Result<String, JsValue> {
        self.session.config().to_json().map_err(to_js)
    }

    // ========================================================================
    // Pages
    // ========================================================================

    /// Make `bytes` available to the next load under `name`.
    pub fn stage_file(&mut self, name: String, bytes: Vec<u8>) {
        // The receiver lives as long as the session that owns it
        let _ = self.staging.send((name, bytes));
    }

    /// Load staged files. `mode` is `append`, `insert` or `replace`.
    ///
    /// Returns `{ loaded, failed: [{ path, reason }], first_index }`.
    pub fn load(&mut self, names: Vec<String>, mode: &str, selected: &[u32]) -> Result<JsValue, JsValue> {
        let mode = load_mode_from_str(mode).map_err(to_js)?;
        let rows = self.checked_rows(selected).map_err(to_js)?;
        let report = self.load_files(&names, mode, &rows).map_err(to_js)?;
        serde_wasm_bindgen::to_value(&report).map_err(to_js)
    }

    /// Delete the selected pages; returns the index to select next.
    pub fn delete_selection(&mut self, selected: &[u32]) -> Result<Option<u32>, JsValue> {
        let rows = self.checked_rows(selected).map_err(to_js)?;
        let next = self.session.delete_selection(&rows).map_err(to_js)?;
        Ok(next.map(|i| i as u32))
    }

    /// Rotate the selected pages: `cw`, `ccw` or `half`.
    pub fn rotate_selection(&mut self, selected: &[u32], command: &str) -> Result<(), JsValue> {
        let command = rotate_from_str(command).map_err(to_js)?;
        let rows = self.checked_rows(selected).map_err(to_js)?;
        self.session.rotate_selection(&rows, command).map_err(to_js)
    }

    /// Mirror the selected pages: `horizontal` or `vertical`.
    pub fn mirror_selection(&mut self, selected: &[u32], axis: &str) -> Result<(), JsValue> {
        let axis = mirror_from_str(axis).map_err(to_js)?;
        let rows = self.checked_rows(selected).map_err(to_js)?;
        self.session.mirror_selection(&rows, axis).map_err(to_js)
    }

    pub fn to_grayscale_selection(&mut self, selected: &[u32]) -> Result<(), JsValue> {
        let rows = self.checked_rows(selected).map_err(to_js)?;
        self.session.to_grayscale_selection(&rows).map_err(to_js)
    }

    /// Reduce the selected pages to black and white. Without a threshold
    /// each page gets one computed from its own levels.
    pub fn to_binary_selection(&mut self, selected: &[u32], threshold: Option<u8>) -> Result<(), JsValue> {
        let rows = self.checked_rows(selected).map_err(to_js)?;
        self.session
            .to_binary_selection(&rows, threshold)
            .map_err(to_js)
    }

    /// Insert a background-colored page before the selection, or at the
    /// end. Returns its index.
    pub fn insert_blank(&mut self, selected: &[u32]) -> Result<u32, JsValue> {
        let rows = self.checked_rows(selected).map_err(to_js)?;
        Ok(self.session.insert_blank(&rows) as u32)
    }

    /// Tell the editor which pages the list has selected.
    pub fn select(&mut self, selected: &[u32]) -> Result<(), JsValue> {
        let rows = self.checked_rows(selected).map_err(to_js)?;
        self.session.select(&rows);
        Ok(())
    }

    pub fn select_even(&self) -> Vec<u32> {
        to_u32(self.session.pages().select_even())
    }

    pub fn select_odd(&self) -> Vec<u32> {
        to_u32(self.session.pages().select_odd())
    }

    pub fn select_modified(&self) -> Vec<u32> {
        to_u32(self.session.pages().select_modified())
    }

    pub fn any_modified(&self) -> bool {
        self.session.pages().any_modified()
    }

    #[wasm_bindgen(getter)]
    pub fn page_count(&self) -> u32 {
        self.session.pages().len() as u32
    }

    #[wasm_bindgen(getter)]
    pub fn active_index(&self) -> Option<u32> {
        self.session.canvas().active_index().map(|i| i as u32)
    }

    /// Label, name, rotation and edit state of one page.
    pub fn page_info(&self, index: u32) -> Result<JsValue, JsValue> {
        let page = self
            .session
            .pages()
            .get(index as usize)
            .ok_or_else(|| to_js(format!("Page index {index} out of range")))?;
        let (width, height) = page.bitmap().dimensions();
        let info = PageInfo {
            label: page.label(),
            display_name: page.display_name(),
            source_path: page.source_path(),
            rotation: page.rotation(),
            change_count: page.change_count(),
            modified: page.is_modified(),
            width,
            height,
            format: format_name(page.bitmap().format),
        };
        serde_wasm_bindgen::to_value(&info).map_err(to_js)
    }

    pub fn page_bitmap(&self, index: u32) -> Option<JsBitmap> {
        self.session
            .pages()
            .get(index as usize)
            .map(|page| JsBitmap::from_bitmap(page.bitmap()))
    }

    pub fn thumbnail(&self, index: u32) -> Option<JsBitmap> {
        self.session
            .pages()
            .get(index as usize)
            .map(|page| JsBitmap::from_bitmap(page.thumbnail()))
    }

    // ========================================================================
    // Canvas input
    // ========================================================================

    /// `button` follows `MouseEvent.button`: 0 primary, 2 secondary.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: u8, shift: bool) {
        self.session.pointer_down(pointer(x, y, button, shift));
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, button: u8, shift: bool) {
        self.session.pointer_move(pointer(x, y, button, shift));
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, button: u8, shift: bool) {
        self.session.pointer_up(pointer(x, y, button, shift));
    }

    pub fn cancel_gesture(&mut self) {
        self.session
            .with_canvas(|canvas, pages| canvas.cancel_gesture(pages));
    }

    /// `pointer`, `zoom`, `draw`, `erase` or `fill`.
    pub fn set_tool(&mut self, tool: &str) -> Result<(), JsValue> {
        let tool = tool_from_str(tool).map_err(to_js)?;
        self.session.with_canvas(|canvas, _| canvas.set_tool(tool));
        Ok(())
    }

    pub fn set_brush_size(&mut self, size: u32) {
        self.session.with_canvas(|canvas, _| canvas.set_brush_size(size));
    }

    /// Colors as `#rrggbb`.
    pub fn set_colors(&mut self, foreground: &str, background: &str) -> Result<(), JsValue> {
        let fg = color_from_str(foreground).map_err(to_js)?;
        let bg = color_from_str(background).map_err(to_js)?;
        self.session.with_canvas(|canvas, _| canvas.set_colors(fg, bg));
        Ok(())
    }

    pub fn swap_colors(&mut self) {
        self.session.with_canvas(|canvas, _| canvas.swap_colors());
    }

    pub fn reset_colors(&mut self) {
        self.session.with_canvas(|canvas, _| canvas.reset_colors());
    }

    // ========================================================================
    // View
    // ========================================================================

    pub fn zoom_in(&mut self) {
        self.session.with_canvas(|canvas, _| canvas.zoom_in());
    }

    pub fn zoom_out(&mut self) {
        self.session.with_canvas(|canvas, _| canvas.zoom_out());
    }

    /// Wheel zoom keeping `(x, y)` under the pointer.
    pub fn zoom_at(&mut self, x: f64, y: f64, factor: f64) {
        self.session
            .with_canvas(|canvas, _| canvas.zoom_at(Point::new(x, y), factor));
    }

    pub fn zoom_area(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<(), JsValue> {
        self.session
            .with_canvas(|canvas, _| canvas.zoom_area(Rect::new(x, y, width, height)))
            .map_err(to_js)
    }

    pub fn fit_to_window(&mut self) {
        self.session.with_canvas(|canvas, _| canvas.fit_to_window());
    }

    pub fn fit_width(&mut self) {
        self.session.with_canvas(|canvas, _| canvas.fit_width());
    }

    pub fn fit_height(&mut self) {
        self.session.with_canvas(|canvas, _| canvas.fit_height());
    }

    pub fn fill_window(&mut self) {
        self.session.with_canvas(|canvas, _| canvas.fill_window());
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.session.with_canvas(|canvas, _| canvas.pan_by(dx, dy));
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.session
            .with_canvas(|canvas, _| canvas.set_viewport(width, height));
    }

    /// Scale, scroll, tool and band state for drawing the canvas.
    pub fn view_state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.view_state_data()).map_err(to_js)
    }

    // ========================================================================
    // Edits
    // ========================================================================

    pub fn fill_selection(&mut self, outside: bool) -> Result<(), JsValue> {
        self.session
            .with_canvas(|canvas, pages| canvas.fill_selection(pages, outside))
            .map_err(to_js)
    }

    pub fn crop_to_selection(&mut self) -> Result<(), JsValue> {
        self.session
            .with_canvas(|canvas, pages| canvas.crop_to_selection(pages))
            .map_err(to_js)
    }

    /// Returns false when there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, JsValue> {
        self.session.undo().map_err(to_js)
    }

    /// Returns false when there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, JsValue> {
        self.session.redo().map_err(to_js)
    }

    /// Events since the last call, oldest first, as tagged objects
    /// (`{ kind: 'view_changed', ... }`).
    pub fn drain_events(&mut self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.take_events()).map_err(to_js)
    }
}

impl JsPageEditor {
    fn from_config(config_json: Option<&str>) -> Result<Self, String> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(json).map_err(|e| e.to_string())?,
            None => EditorConfig::default(),
        };
        let (staging, incoming) = channel();
        let decoder = StagedDecoder {
            incoming,
            files: MemoryDecoder::new(),
        };
        let mut session = Session::new(config, Box::new(decoder));

        let (tx, events) = channel();
        session.add_observer(Box::new(move |event: &EditorEvent| {
            let _ = tx.send(event.clone());
        }));
        Ok(Self {
            session,
            staging,
            events,
        })
    }

    /// Selected indices from JavaScript, checked against the page count.
    fn checked_rows(&self, selected: &[u32]) -> Result<Vec<usize>, String> {
        let len = self.session.pages().len();
        selected
            .iter()
            .map(|&i| {
                let i = i as usize;
                if i < len {
                    Ok(i)
                } else {
                    Err(format!("Page index {i} out of range for {len} pages"))
                }
            })
            .collect()
    }

    fn load_files(&mut self, names: &[String], mode: LoadMode, rows: &[usize]) -> Result<LoadReport, String> {
        self.session
            .load(names, mode, rows)
            .map_err(|e| e.to_string())
    }

    fn take_events(&mut self) -> Vec<EditorEvent> {
        self.events.try_iter().collect()
    }

    fn view_state_data(&self) -> ViewState {
        let canvas = self.session.canvas();
        let view = canvas.view();
        let scroll = view.scroll();
        let (document_width, document_height) = view.document_size();
        let (visible_width, visible_height) = view.visible_size();
        ViewState {
            scale_factor: view.scale_factor(),
            effective_scale: view.effective_scale(),
            scroll_x: scroll.x,
            scroll_y: scroll.y,
            document_width,
            document_height,
            visible_width,
            visible_height,
            tool: canvas.tool(),
            gesture: canvas.gesture(),
            band: canvas.band(),
            selection: canvas.selection(),
            brush_size: canvas.brush_size(),
            foreground: canvas.foreground().to_hex(),
            background: canvas.background().to_hex(),
            can_zoom_in: canvas.can_zoom_in(),
            can_zoom_out: canvas.can_zoom_out(),
            can_undo: canvas.history().can_undo(),
            can_redo: canvas.history().can_redo(),
        }
    }
}

fn pointer(x: f64, y: f64, button: u8, shift: bool) -> PointerEvent {
    PointerEvent {
        pos: Point::new(x, y),
        button: button_from_u8(button),
        shift,
    }
}

fn to_u32(rows: Vec<usize>) -> Vec<u32> {
    rows.into_iter().map(|i| i as u32).collect()
}
