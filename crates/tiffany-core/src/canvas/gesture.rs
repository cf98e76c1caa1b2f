//! Tool and pointer-gesture vocabulary.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// What the primary pointer button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolMode {
    /// Drag out a selection region.
    #[default]
    Pointer,
    /// Drag out an area to zoom into.
    Zoom,
    /// Freehand strokes in the foreground color.
    Draw,
    /// Freehand strokes in the background color.
    Erase,
    /// Drag out an area to fill with the background color.
    Fill,
}

impl ToolMode {
    /// Whether the primary button paints strokes in this mode.
    pub fn is_stroke(self) -> bool {
        matches!(self, ToolMode::Draw | ToolMode::Erase)
    }
}

/// Where the canvas is within a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureState {
    #[default]
    Idle,
    /// A rubber band is being dragged.
    RubberBanding,
    /// A stroke is being drawn.
    Drawing,
    /// The view follows the pointer.
    Panning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    /// Usually the left button; drives the current tool.
    Primary,
    /// Usually the right button; area zoom, or panning with shift held.
    Secondary,
}

/// A pointer sample in view coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub pos: Point,
    pub button: PointerButton,
    #[serde(default)]
    pub shift: bool,
}

impl PointerEvent {
    pub fn primary(x: f64, y: f64) -> Self {
        Self {
            pos: Point::new(x, y),
            button: PointerButton::Primary,
            shift: false,
        }
    }

    pub fn secondary(x: f64, y: f64) -> Self {
        Self {
            pos: Point::new(x, y),
            button: PointerButton::Secondary,
            shift: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// What a rubber band does when released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BandPurpose {
    Select,
    Zoom,
    Fill,
}

impl BandPurpose {
    pub(crate) fn for_tool(tool: ToolMode) -> Option<Self> {
        match tool {
            ToolMode::Pointer => Some(BandPurpose::Select),
            ToolMode::Zoom => Some(BandPurpose::Zoom),
            ToolMode::Fill => Some(BandPurpose::Fill),
            ToolMode::Draw | ToolMode::Erase => None,
        }
    }
}
