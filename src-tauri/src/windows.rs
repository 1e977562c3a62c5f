//! Overlay and response window management.
//!
//! Both windows are created on demand and destroyed when done. Geometry is
//! in logical pixels, matching the display layout from xcap.

use crate::capture::{Display, SelectionRect};
use tauri::{AppHandle, Manager, WebviewUrl, WebviewWindowBuilder};

pub const OVERLAY_LABEL: &str = "overlay";
pub const RESPONSE_LABEL: &str = "response";

const RESPONSE_WIDTH: f64 = 420.0;
const RESPONSE_HEIGHT: f64 = 320.0;
const RESPONSE_GAP: f64 = 12.0;

/// Open the selection overlay covering exactly one display.
pub fn open_overlay(app: &AppHandle, display: &Display) -> tauri::Result<()> {
    close_overlay(app);

    let start = std::time::Instant::now();
    let window = WebviewWindowBuilder::new(app, OVERLAY_LABEL, WebviewUrl::App("overlay.html".into()))
        .title("SnapLens Overlay")
        .position(f64::from(display.x), f64::from(display.y))
        .inner_size(f64::from(display.width), f64::from(display.height))
        .transparent(true)
        .decorations(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .resizable(false)
        .focused(true)
        .build()?;
    if let Err(e) = window.set_focus() {
        log::warn!("[CAPTURE] Failed to focus overlay: {}", e);
    }

    log::info!(
        "[CAPTURE] Overlay opened on display {} in {}ms",
        display.id,
        start.elapsed().as_millis()
    );
    Ok(())
}

/// Tear down the overlay if it exists. Idempotent.
pub fn close_overlay(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(OVERLAY_LABEL) {
        if let Err(e) = window.destroy() {
            log::warn!("[CAPTURE] Failed to destroy overlay: {}", e);
        }
    }
}

/// Where the response panel goes: beside the selection, kept on its display.
fn response_position(display: &Display, selection: &SelectionRect) -> (f64, f64) {
    let right_edge = f64::from(display.x) + f64::from(display.width);
    let bottom_edge = f64::from(display.y) + f64::from(display.height);

    let mut x = f64::from(display.x) + selection.x + selection.width + RESPONSE_GAP;
    if x + RESPONSE_WIDTH > right_edge {
        x = f64::from(display.x) + selection.x - RESPONSE_WIDTH - RESPONSE_GAP;
    }
    let x = x.clamp(f64::from(display.x), (right_edge - RESPONSE_WIDTH).max(f64::from(display.x)));

    let y = (f64::from(display.y) + selection.y)
        .clamp(f64::from(display.y), (bottom_edge - RESPONSE_HEIGHT).max(f64::from(display.y)));
    (x, y)
}

/// Show the response panel, reusing it if already open.
///
/// With an anchor it sits beside the selection on that display; without
/// one (replay from the tray) a new window is centred.
pub fn open_response(app: &AppHandle, anchor: Option<(&Display, &SelectionRect)>) -> tauri::Result<()> {
    let position = anchor.map(|(display, selection)| response_position(display, selection));

    if let Some(window) = app.get_webview_window(RESPONSE_LABEL) {
        if let Some((x, y)) = position {
            window.set_position(tauri::LogicalPosition::new(x, y))?;
        }
        window.show()?;
        window.set_focus()?;
        return Ok(());
    }

    let builder = WebviewWindowBuilder::new(app, RESPONSE_LABEL, WebviewUrl::App("response.html".into()))
        .title("SnapLens")
        .inner_size(RESPONSE_WIDTH, RESPONSE_HEIGHT)
        .decorations(false)
        .always_on_top(true)
        .skip_taskbar(true)
        .resizable(true);
    let builder = match position {
        Some((x, y)) => builder.position(x, y),
        None => builder.center(),
    };
    builder.build()?;
    log::info!("[RENDER] Response window opened at {:?}", position);
    Ok(())
}

pub fn close_response(app: &AppHandle) {
    if let Some(window) = app.get_webview_window(RESPONSE_LABEL) {
        if let Err(e) = window.destroy() {
            log::warn!("[RENDER] Failed to destroy response window: {}", e);
        }
    }
}

/// Show/hide the response panel. Returns whether it is now visible.
pub fn toggle_response(app: &AppHandle) -> tauri::Result<bool> {
    let Some(window) = app.get_webview_window(RESPONSE_LABEL) else {
        return Ok(false);
    };
    if window.is_visible()? {
        window.hide()?;
        Ok(false)
    } else {
        window.show()?;
        window.set_focus()?;
        Ok(true)
    }
}
