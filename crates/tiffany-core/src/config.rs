//! Editor configuration.
//!
//! Settings are plain serde data so hosts can persist them as JSON. Every
//! field has a default, so a partial or empty document loads fine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::DEFAULT_UNDO_DEPTH;
use crate::thumbnail::DEFAULT_THUMBNAIL_SIZE;
use crate::Color;

/// Brush sizes offered by the brush menu, in bitmap pixels.
pub const BRUSH_SIZES: [u32; 4] = [1, 4, 8, 12];

/// Errors while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is outside its allowed range
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// I/O error when reading the config file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Tunable editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Snapshots kept on each side of the undo/redo stack.
    pub undo_depth: usize,
    /// Edge length of page icons in pixels.
    pub thumbnail_size: u32,
    /// Zoom-in is disabled at or above this scale factor.
    pub max_zoom: f64,
    /// Zoom-out is disabled at or below this scale factor.
    pub min_zoom: f64,
    /// Thickness of a scrollbar in view units, reserved by fit-width/height.
    pub scrollbar_extent: f64,
    /// Initial brush size; snapped to [`BRUSH_SIZES`].
    pub brush_size: u32,
    #[serde(with = "hex_color")]
    pub foreground: Color,
    #[serde(with = "hex_color")]
    pub background: Color,
    /// Viewport size used until the host reports the real one.
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            undo_depth: DEFAULT_UNDO_DEPTH,
            thumbnail_size: DEFAULT_THUMBNAIL_SIZE,
            max_zoom: 10.0,
            min_zoom: 0.1,
            scrollbar_extent: 16.0,
            brush_size: 1,
            foreground: Color::BLACK,
            background: Color::WHITE,
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}

impl EditorConfig {
    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check ranges and snap the brush size to a menu entry.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.undo_depth == 0 {
            return Err(ConfigError::Invalid("undo_depth must be at least 1".into()));
        }
        if self.thumbnail_size == 0 {
            return Err(ConfigError::Invalid("thumbnail_size must be at least 1".into()));
        }
        if self.min_zoom.is_nan() || self.min_zoom <= 0.0 || self.min_zoom >= self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds must satisfy 0 < min_zoom < max_zoom (got {} and {})",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.scrollbar_extent.is_nan() || self.scrollbar_extent < 0.0 {
            return Err(ConfigError::Invalid("scrollbar_extent must not be negative".into()));
        }
        if self.viewport_width.is_nan()
            || self.viewport_height.is_nan()
            || self.viewport_width <= 0.0
            || self.viewport_height <= 0.0
        {
            return Err(ConfigError::Invalid("viewport must have a positive size".into()));
        }
        self.brush_size = snap_brush_size(self.brush_size);
        Ok(())
    }
}

/// The largest menu brush size not above `size`, or the smallest one.
pub fn snap_brush_size(size: u32) -> u32 {
    BRUSH_SIZES
        .iter()
        .rev()
        .copied()
        .find(|&b| b <= size)
        .unwrap_or(BRUSH_SIZES[0])
}

/// Colors as `#rrggbb` strings.
mod hex_color {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::Color;

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| de::Error::custom(format!("invalid color {s:?}")))
    }
}
