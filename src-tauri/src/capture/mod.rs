//! Screen capture domain — public API.
//!
//! This module owns all screen capture functionality: which display is
//! active, how a logical selection maps onto its framebuffer, which backend
//! source to read, and how the crop is encoded.
//! External code should only use the items exported here.

mod display;
mod region;
mod scale;
#[cfg(feature = "desktop")]
mod screenshot;
mod source;

pub use display::{
    logical_layout, physical_point_in_layout, physical_to_logical, resolve_active_display, Display, Point,
};
pub use region::{clamp_to_frame, crop, CapturedImage};
pub use scale::{to_physical, PhysicalRect, SelectionRect};
#[cfg(feature = "desktop")]
pub use screenshot::{capture_sources, cursor_to_logical, enumerate_displays, MonitorSource};
pub use source::{pick_source, CaptureSource};

use crate::error::CaptureError;

/// Run the whole capture path against one snapshot of displays and sources.
///
/// resolve display → scale selection → pick source → grab → crop + encode.
/// A zero-area selection returns `InvalidSelection` before anything is
/// resolved or grabbed; a missing source aborts before any frame is read.
pub fn capture_region<S: CaptureSource>(
    displays: &[Display],
    sources: &[S],
    cursor: Point,
    selection: &SelectionRect,
) -> Result<CapturedImage, CaptureError> {
    if selection.is_empty() {
        log::info!("[CAPTURE] Zero-area selection — treating as cancel");
        return Err(CaptureError::InvalidSelection);
    }

    let start = std::time::Instant::now();
    let display = resolve_active_display(displays, cursor);
    let physical = to_physical(selection, &display);
    log::info!(
        "[CAPTURE] Display {} ({}x{} @ {}x) selection {{x: {}, y: {}, w: {}, h: {}}} → physical {:?}",
        display.id,
        display.width,
        display.height,
        display.scale_factor,
        selection.x,
        selection.y,
        selection.width,
        selection.height,
        physical
    );

    let source = pick_source(sources, &display)?;
    let frame = source.grab()?;
    log::info!(
        "[CAPTURE] Grabbed display {} frame {}x{} in {}ms",
        display.id,
        frame.width(),
        frame.height(),
        start.elapsed().as_millis()
    );

    crop(&frame, &physical)
}
