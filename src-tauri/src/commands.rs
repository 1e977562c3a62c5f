//! Tauri command handlers.
//!
//! Thin wrappers that bridge frontend invoke() calls to Rust. Multi-step
//! work lives in pipeline.rs.

use crate::capture::{Point, SelectionRect};
use crate::llm::GroqClient;
use crate::pipeline::{self, ResponseState};
use crate::relay::{StreamingRelay, Transcript};
use crate::windows;
use std::sync::Arc;

/// Tauri command: the overlay finished a drag.
///
/// `selection` is relative to the overlay's display in logical pixels;
/// `cursor` is the global logical mouse-up position; `mode` is a task tag
/// (`summary`, `translate French`, ...) or the user's own prompt.
#[tauri::command]
pub async fn capture_region(
    app: tauri::AppHandle,
    selection: SelectionRect,
    cursor: Point,
    mode: String,
) -> Result<(), String> {
    pipeline::process_capture(&app, selection, cursor, &mode).await
}

/// Tauri command: Escape / Cancel in the overlay. Idempotent.
#[tauri::command]
pub fn cancel_overlay(app: tauri::AppHandle) -> Result<(), String> {
    windows::close_overlay(&app);
    log::info!("[CAPTURE] Overlay cancelled");
    Ok(())
}

/// Tauri command: open the overlay (same as the capture hot-key).
#[tauri::command]
pub fn start_capture(app: tauri::AppHandle) -> Result<(), String> {
    pipeline::start_capture(&app)
}

/// Tauri command: close the response window, cancelling its request.
#[tauri::command]
pub fn close_response(app: tauri::AppHandle) -> Result<(), String> {
    pipeline::close_response(&app);
    Ok(())
}

/// Tauri command: hide or show the response window.
#[tauri::command]
pub fn toggle_response(app: tauri::AppHandle) -> Result<bool, String> {
    windows::toggle_response(&app).map_err(|e| e.to_string())
}

/// Tauri command: re-send the last image and prompt. Returns the new
/// request id.
#[tauri::command]
pub fn replay_last(app: tauri::AppHandle) -> Result<u64, String> {
    pipeline::replay(&app)
}

/// Tauri command: what the latest request has produced so far.
///
/// Called by the response window on load; live `relay-event`s cover the
/// rest.
#[tauri::command]
pub fn get_transcript(state: tauri::State<'_, ResponseState>) -> Result<Transcript, String> {
    let guard = state.transcript.lock().map_err(|e| e.to_string())?;
    Ok(guard.clone())
}

/// Tauri command: the last captured region as a data URL, for the
/// response window's preview.
#[tauri::command]
pub fn get_last_capture(relay: tauri::State<'_, StreamingRelay>) -> Result<String, String> {
    relay
        .last_session()
        .map(|session| session.request.image.to_data_url())
        .ok_or_else(|| "No capture yet".to_string())
}

/// Tauri command: copy text to the system clipboard.
///
/// Uses arboard for native clipboard access — navigator.clipboard is
/// unreliable in undecorated always-on-top webviews.
#[tauri::command]
pub fn copy_to_clipboard(text: String) -> Result<(), String> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| e.to_string())?;
    clipboard.set_text(&text).map_err(|e| e.to_string())?;
    log::info!("[ACTION] Copied {} chars to clipboard", text.len());
    Ok(())
}

/// Tauri command: store a Groq API key in the OS keychain and use it
/// for subsequent requests.
#[tauri::command]
pub fn save_api_key(
    client: tauri::State<'_, Arc<GroqClient>>,
    api_key: String,
) -> Result<(), String> {
    crate::config::save_api_key(&api_key).map_err(|e| e.to_string())?;
    client.set_api_key(api_key.trim());
    Ok(())
}

/// Tauri command: whether requests can be sent at all.
#[tauri::command]
pub fn has_api_key(client: tauri::State<'_, Arc<GroqClient>>) -> bool {
    client.has_api_key()
}
