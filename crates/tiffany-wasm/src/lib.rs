//! Tiffany WASM - WebAssembly bindings for the Tiffany page editor
//!
//! This crate exposes a tiffany-core editing session to JavaScript/TypeScript
//! hosts. The host owns the window, the page list widget and file pickers; the
//! editor owns the pages, the canvas transform, tools and undo history.
//!
//! # Module Structure
//!
//! - `editor` - The `JsPageEditor` session wrapper
//! - `types` - WASM-compatible bitmap wrapper and string conversions
//! - `logger` - `log` backend writing to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsPageEditor, set_log_level } from '@tiffany/wasm';
//!
//! await init();
//! set_log_level('debug');
//!
//! const editor = new JsPageEditor(JSON.stringify({ thumbnail_size: 96 }));
//! editor.set_viewport(canvas.clientWidth, canvas.clientHeight);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod logger;
mod types;

pub use editor::JsPageEditor;
pub use types::JsBitmap;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Info);
}

/// Set the console log level: `error`, `warn`, `info`, `debug` or `trace`.
///
/// Unknown names select `info`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    logger::install(logger::level_from_str(level));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
