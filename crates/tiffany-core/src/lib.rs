//! Tiffany Core - page collection and canvas editing model
//!
//! This crate provides the editing core of Tiffany, a scanned-page cleanup
//! editor: an ordered collection of pages, the interactive canvas with its
//! zoom/pan transform and tool state machine, a bounded undo/redo stack and
//! thumbnail rendering. Windowing, dialogs and persistence live outside and
//! talk to the core through the traits in [`events`] and [`decode`].

pub mod bitmap;
pub mod canvas;
pub mod collection;
pub mod config;
pub mod decode;
pub mod draw;
pub mod error;
pub mod events;
pub mod geometry;
pub mod history;
pub mod luminance;
pub mod page;
pub mod session;
pub mod thumbnail;
pub mod transform;

pub use bitmap::{Bitmap, PixelFormat};
pub use canvas::{
    CanvasView, GestureState, PointerButton, PointerEvent, ToolMode, ViewMemo, ViewTransform, Viewport,
};
pub use collection::{LoadFailure, LoadMode, LoadReport, MirrorAxis, PageCollection, RotateCommand};
pub use config::{ConfigError, EditorConfig};
pub use decode::{DecodeError, Decoder, FileDecoder, MemoryDecoder, SourceImage};
pub use error::EditError;
pub use events::{EditorEvent, EditorObserver, ProgressSink, ProgressUpdate, SaveHook};
pub use geometry::{PixelRect, Point, Rect};
pub use history::EditStack;
pub use page::{Page, PageId};
pub use session::Session;
pub use thumbnail::ThumbnailRenderer;

/// An opaque 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A neutral gray with all channels set to `v`.
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }

    /// Perceptual luminance of this color (0-255).
    pub fn luma(self) -> u8 {
        luminance::luma_u8(self.r, self.g, self.b)
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Format as `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}
