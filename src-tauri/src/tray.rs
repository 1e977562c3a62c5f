//! System tray: the app's only persistent surface.
//!
//! Left-click starts a capture. The menu offers Capture, Replay and Quit.

use crate::pipeline;
use tauri::{
    image::Image as TauriImage,
    menu::{MenuBuilder, MenuItemBuilder},
    tray::TrayIconBuilder,
    AppHandle,
};

pub fn setup_tray(app: &AppHandle) -> Result<(), Box<dyn std::error::Error>> {
    let capture_item = MenuItemBuilder::with_id("capture", "Capture Region").build(app)?;
    let replay_item = MenuItemBuilder::with_id("replay", "Replay Last").build(app)?;
    let quit_item = MenuItemBuilder::with_id("quit", "Quit SnapLens").build(app)?;
    let menu = MenuBuilder::new(app)
        .item(&capture_item)
        .item(&replay_item)
        .separator()
        .item(&quit_item)
        .build()?;

    // Decode the PNG icon to RGBA for Tauri's Image type
    let icon_bytes = include_bytes!("../icons/32x32.png");
    let icon_img = image::load_from_memory(icon_bytes)
        .map_err(|e| format!("Failed to decode tray icon: {}", e))?;
    let rgba = icon_img.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let tray_icon = TauriImage::new_owned(rgba.into_raw(), w, h);

    let _tray = TrayIconBuilder::new()
        .icon(tray_icon)
        .tooltip("SnapLens — Click to capture")
        .menu(&menu)
        .show_menu_on_left_click(false)
        .on_tray_icon_event(|tray_icon, event| {
            if let tauri::tray::TrayIconEvent::Click {
                button: tauri::tray::MouseButton::Left,
                button_state: tauri::tray::MouseButtonState::Up,
                ..
            } = event
            {
                if let Err(e) = pipeline::start_capture(tray_icon.app_handle()) {
                    log::error!("Failed to start capture: {}", e);
                }
            }
        })
        .on_menu_event(|app, event| match event.id().as_ref() {
            "capture" => {
                if let Err(e) = pipeline::start_capture(app) {
                    log::error!("Failed to start capture: {}", e);
                }
            }
            "replay" => {
                if let Err(e) = pipeline::replay(app) {
                    log::warn!("Replay unavailable: {}", e);
                }
            }
            "quit" => {
                log::info!("Quit requested from tray menu");
                app.exit(0);
            }
            _ => {}
        })
        .build(app)?;

    Ok(())
}
