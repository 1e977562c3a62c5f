//! Coordinate Scaler — logical selection → physical framebuffer pixels.

use super::display::Display;
use serde::{Deserialize, Serialize};

/// A user selection in logical pixels, relative to the active display's origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Build a rectangle from the two corners of a drag, in either direction.
    pub fn from_corners(start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Self {
        Self {
            x: start_x.min(end_x),
            y: start_y.min(end_y),
            width: (end_x - start_x).abs(),
            height: (end_y - start_y).abs(),
        }
    }

    /// Zero-area (or NaN) selections mean the user backed out.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// A rectangle in physical pixels of one display's framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhysicalRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PhysicalRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Scale a logical selection into physical pixels for `display`.
///
/// Each component is `floor(logical * scale_factor)`. Truncation, not
/// rounding: the capture backend reads pixel offsets the same way, and
/// rounding shifts selection edges by one pixel. No clamping happens here;
/// the overlay keeps selections inside the display and the cropper clamps to
/// the actual frame.
pub fn to_physical(selection: &SelectionRect, display: &Display) -> PhysicalRect {
    let scale = display.scale_factor;
    PhysicalRect {
        x: floor_px(selection.x * scale),
        y: floor_px(selection.y * scale),
        width: floor_px(selection.width * scale),
        height: floor_px(selection.height * scale),
    }
}

// `as` saturates: negatives and NaN land on 0, overflow on u32::MAX.
fn floor_px(value: f64) -> u32 {
    value.floor() as u32
}
