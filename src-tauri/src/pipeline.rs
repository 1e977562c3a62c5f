//! Capture → prompt → relay orchestration.
//!
//! - start_capture: resolve the display under the pointer, open the overlay
//! - process_capture: close overlay → grab + crop → open response → relay
//! - replay: re-run the stored session into the response window

use crate::capture::{self, CapturedImage, Display, Point, SelectionRect};
use crate::config::Config;
use crate::error::CaptureError;
use crate::llm::{build_prompt, PromptMode};
use crate::relay::{PreparedRun, RelayEvent, ResponseSink, StreamingRelay, Transcript};
use crate::windows;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tauri::{AppHandle, Emitter, Manager, WindowEvent};

/// Event name the response window listens on.
pub const RELAY_EVENT: &str = "relay-event";

/// Time for the compositor to drop the overlay before the frame is grabbed.
const OVERLAY_SETTLE: Duration = Duration::from_millis(120);

/// Transcript of the latest request, for a response window that opens
/// after fragments have already been emitted.
pub struct ResponseState {
    pub transcript: Mutex<Transcript>,
}

impl ResponseState {
    pub fn new() -> Self {
        Self {
            transcript: Mutex::new(Transcript::default()),
        }
    }
}

/// Delivers relay events to the response window.
struct WindowSink {
    app: AppHandle,
}

impl ResponseSink for WindowSink {
    fn deliver(&self, event: RelayEvent) {
        if let Ok(mut transcript) = self.app.state::<ResponseState>().transcript.lock() {
            transcript.apply(&event);
        }
        if let Err(e) = self.app.emit_to(windows::RESPONSE_LABEL, RELAY_EVENT, &event) {
            log::warn!("[RELAY] Failed to emit {:?}: {}", event, e);
        }
    }
}

/// Window lifecycle hook. Losing the response window by any route cancels
/// its upstream request. Returns whether a request was cancelled.
pub fn on_window_event(label: &str, event: &WindowEvent, relay: &StreamingRelay) -> bool {
    if label != windows::RESPONSE_LABEL || !matches!(event, WindowEvent::Destroyed) {
        return false;
    }
    let cancelled = relay.cancel_active();
    if cancelled {
        log::info!("[RELAY] Response window destroyed, upstream cancelled");
    }
    cancelled
}

/// Hot-key / tray entry point: put the overlay on the display under the
/// pointer.
pub fn start_capture(app: &AppHandle) -> Result<(), String> {
    let displays = capture::enumerate_displays().map_err(|e| e.to_string())?;
    let cursor = match app.cursor_position() {
        Ok(pos) => capture::cursor_to_logical(pos.x, pos.y).map_err(|e| e.to_string())?,
        Err(e) => {
            log::warn!("[CAPTURE] Cursor position unavailable ({}), using origin", e);
            Point::new(0.0, 0.0)
        }
    };
    let display = capture::resolve_active_display(&displays, cursor);
    windows::open_overlay(app, &display).map_err(|e| e.to_string())
}

/// Grab and crop on a blocking thread. Everything backend-facing is
/// created and dropped there.
async fn grab_selection(
    cursor: Point,
    selection: SelectionRect,
) -> Result<(CapturedImage, Display), CaptureError> {
    tauri::async_runtime::spawn_blocking(move || -> Result<_, CaptureError> {
        let displays = capture::enumerate_displays()?;
        let sources = capture::capture_sources()?;
        let image = capture::capture_region(&displays, &sources, cursor, &selection)?;
        Ok((image, capture::resolve_active_display(&displays, cursor)))
    })
    .await
    .map_err(|e| CaptureError::Backend(format!("capture task failed: {}", e)))?
}

fn dump_debug_capture(image: &CapturedImage) {
    let path = std::env::temp_dir().join("snaplens-capture.png");
    match image.write_png(&path) {
        Ok(()) => log::info!("[CAPTURE] Debug crop written to {}", path.display()),
        Err(e) => log::warn!("[CAPTURE] Debug crop write failed: {}", e),
    }
}

/// The overlay finished a selection.
///
/// Zero-area selections are a cancel: the overlay closes and nothing else
/// happens. Capture failures close the overlay and return the error. The
/// relay runs on its own task; this returns once it has started.
pub async fn process_capture(
    app: &AppHandle,
    selection: SelectionRect,
    cursor: Point,
    raw_mode: &str,
) -> Result<(), String> {
    let pipeline_start = std::time::Instant::now();
    windows::close_overlay(app);

    if selection.is_empty() {
        log::info!("[CAPTURE] Zero-area selection — cancelled");
        return Ok(());
    }
    tokio::time::sleep(OVERLAY_SETTLE).await;

    let (image, display) = match grab_selection(cursor, selection).await {
        Ok(captured) => captured,
        Err(e) if e.is_cancellation() => return Ok(()),
        Err(e) => {
            log::error!("[CAPTURE] {}", e);
            return Err(e.to_string());
        }
    };
    let capture_ms = pipeline_start.elapsed().as_millis();

    if app.state::<Config>().debug_capture {
        dump_debug_capture(&image);
    }

    let mode = PromptMode::parse(raw_mode);
    let prompt = build_prompt(&mode);
    log::info!("[PROMPT] Mode: {} ({} chars)", mode.label(), prompt.len());

    windows::open_response(app, Some((&display, &selection))).map_err(|e| e.to_string())?;

    let run = app.state::<StreamingRelay>().begin(Arc::new(image), prompt);
    spawn_run(app, run);

    log::info!(
        "[PIPELINE] Local processing: {}ms (capture={})",
        pipeline_start.elapsed().as_millis(),
        capture_ms
    );
    Ok(())
}

/// Re-run the last request. Returns the new request id.
pub fn replay(app: &AppHandle) -> Result<u64, String> {
    let run = app
        .state::<StreamingRelay>()
        .begin_replay()
        .map_err(|e| e.to_string())?;
    let id = run.id();
    windows::open_response(app, None).map_err(|e| e.to_string())?;
    spawn_run(app, run);
    Ok(id)
}

/// Close the response window and cancel whatever it was showing.
pub fn close_response(app: &AppHandle) {
    if app.state::<StreamingRelay>().cancel_active() {
        log::info!("[RELAY] Response closed mid-stream");
    }
    windows::close_response(app);
}

fn spawn_run(app: &AppHandle, run: PreparedRun) {
    let app = app.clone();
    tauri::async_runtime::spawn(async move {
        let sink = WindowSink { app: app.clone() };
        let relay = app.state::<StreamingRelay>();
        relay.run(run, &sink).await;
    });
}
