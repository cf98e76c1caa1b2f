//! WASM-compatible wrapper types and string conversions.
//!
//! JavaScript passes commands as short strings and pointer buttons as DOM
//! `MouseEvent.button` numbers; this module maps them onto the core's enums.

use tiffany_core::{Bitmap, Color, LoadMode, MirrorAxis, PixelFormat, PointerButton, RotateCommand, ToolMode};
use wasm_bindgen::prelude::*;

/// A page bitmap or icon handed to JavaScript.
///
/// The pixel data is stored in WASM memory. `pixels()` and `rgba()` copy it
/// out to a `Uint8Array`.
#[wasm_bindgen]
pub struct JsBitmap {
    width: u32,
    height: u32,
    channels: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsBitmap {
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// 1 for grayscale, 3 for RGB.
    #[wasm_bindgen(getter)]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Raw pixel data, row-major, `channels` bytes per pixel.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Pixels expanded to opaque RGBA, ready for `ImageData`.
    pub fn rgba(&self) -> Vec<u8> {
        let channels = self.channels as usize;
        let mut out = Vec::with_capacity(self.pixels.len() / channels.max(1) * 4);
        for px in self.pixels.chunks_exact(channels.max(1)) {
            match px {
                [v] => out.extend_from_slice(&[*v, *v, *v, 255]),
                [r, g, b] => out.extend_from_slice(&[*r, *g, *b, 255]),
                _ => out.extend_from_slice(&[0, 0, 0, 255]),
            }
        }
        out
    }

    /// Explicitly free WASM memory.
    ///
    /// Optional; wasm-bindgen's finalizer releases it otherwise.
    pub fn free(self) {}
}

impl JsBitmap {
    pub(crate) fn from_bitmap(bitmap: &Bitmap) -> Self {
        Self {
            width: bitmap.width,
            height: bitmap.height,
            channels: bitmap.format.channels() as u32,
            pixels: bitmap.pixels.clone(),
        }
    }
}

pub(crate) fn tool_from_str(value: &str) -> Result<ToolMode, String> {
    match value {
        "pointer" => Ok(ToolMode::Pointer),
        "zoom" => Ok(ToolMode::Zoom),
        "draw" => Ok(ToolMode::Draw),
        "erase" => Ok(ToolMode::Erase),
        "fill" => Ok(ToolMode::Fill),
        other => Err(format!("Unknown tool: {other}")),
    }
}

pub(crate) fn load_mode_from_str(value: &str) -> Result<LoadMode, String> {
    match value {
        "append" => Ok(LoadMode::Append),
        "insert" => Ok(LoadMode::InsertBeforeSelection),
        "replace" => Ok(LoadMode::ReplaceSelection),
        other => Err(format!("Unknown load mode: {other}")),
    }
}

pub(crate) fn rotate_from_str(value: &str) -> Result<RotateCommand, String> {
    match value {
        "cw" | "clockwise" => Ok(RotateCommand::Clockwise),
        "ccw" | "counter_clockwise" => Ok(RotateCommand::CounterClockwise),
        "half" | "half_turn" => Ok(RotateCommand::HalfTurn),
        other => Err(format!("Unknown rotation: {other}")),
    }
}

pub(crate) fn mirror_from_str(value: &str) -> Result<MirrorAxis, String> {
    match value {
        "horizontal" => Ok(MirrorAxis::Horizontal),
        "vertical" => Ok(MirrorAxis::Vertical),
        other => Err(format!("Unknown mirror axis: {other}")),
    }
}

/// DOM button numbers: 2 is the right button, anything else acts as primary.
pub(crate) fn button_from_u8(value: u8) -> PointerButton {
    match value {
        2 => PointerButton::Secondary,
        _ => PointerButton::Primary,
    }
}

pub(crate) fn color_from_str(value: &str) -> Result<Color, String> {
    Color::from_hex(value).ok_or_else(|| format!("Invalid color: {value}"))
}

/// The pixel format name JavaScript sees in page info.
pub(crate) fn format_name(format: PixelFormat) -> &'static str {
    match format {
        PixelFormat::Gray8 => "gray8",
        PixelFormat::Rgb8 => "rgb8",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_bitmap_from_gray() {
        let bitmap = Bitmap::filled(2, 1, PixelFormat::Gray8, Color::gray(7));
        let js = JsBitmap::from_bitmap(&bitmap);
        assert_eq!(js.width(), 2);
        assert_eq!(js.height(), 1);
        assert_eq!(js.channels(), 1);
        assert_eq!(js.pixels(), vec![7, 7]);
        assert_eq!(js.rgba(), vec![7, 7, 7, 255, 7, 7, 7, 255]);
    }

    #[test]
    fn test_js_bitmap_rgba_from_rgb() {
        let bitmap = Bitmap::filled(1, 1, PixelFormat::Rgb8, Color::rgb(1, 2, 3));
        assert_eq!(JsBitmap::from_bitmap(&bitmap).rgba(), vec![1, 2, 3, 255]);
    }

    #[test]
    fn test_tool_names() {
        assert_eq!(tool_from_str("erase"), Ok(ToolMode::Erase));
        assert_eq!(tool_from_str("fill"), Ok(ToolMode::Fill));
        assert!(tool_from_str("lasso").is_err());
    }

    #[test]
    fn test_command_names() {
        assert_eq!(load_mode_from_str("insert"), Ok(LoadMode::InsertBeforeSelection));
        assert_eq!(rotate_from_str("ccw"), Ok(RotateCommand::CounterClockwise));
        assert_eq!(rotate_from_str("half_turn"), Ok(RotateCommand::HalfTurn));
        assert_eq!(mirror_from_str("vertical"), Ok(MirrorAxis::Vertical));
        assert!(load_mode_from_str("prepend").is_err());
    }

    #[test]
    fn test_button_mapping() {
        assert_eq!(button_from_u8(0), PointerButton::Primary);
        assert_eq!(button_from_u8(1), PointerButton::Primary);
        assert_eq!(button_from_u8(2), PointerButton::Secondary);
    }

    #[test]
    fn test_color_parsing() {
        assert_eq!(color_from_str("#ff0000"), Ok(Color::RED));
        assert!(color_from_str("red").is_err());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(format_name(PixelFormat::Gray8), "gray8");
        assert_eq!(format_name(PixelFormat::Rgb8), "rgb8");
    }
}
