//! Global hot-keys: one starts a capture, one shows/hides the response.

use crate::config::ShortcutConfig;
use crate::{pipeline, windows};
use tauri::AppHandle;
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutState};

/// Install the global-shortcut plugin and bind both hot-keys.
///
/// A hot-key another app already owns is logged and skipped; the tray
/// still works.
pub fn register(app: &AppHandle, config: &ShortcutConfig) -> Result<(), Box<dyn std::error::Error>> {
    let capture: Shortcut = config.capture.parse()?;
    let toggle: Shortcut = config.toggle_response.parse()?;

    app.plugin(
        tauri_plugin_global_shortcut::Builder::new()
            .with_handler(move |app, shortcut, event| {
                if event.state() != ShortcutState::Pressed {
                    return;
                }
                if shortcut == &capture {
                    log::info!("[SHORTCUT] Capture");
                    if let Err(e) = pipeline::start_capture(app) {
                        log::error!("[SHORTCUT] Failed to start capture: {}", e);
                    }
                } else if shortcut == &toggle {
                    match windows::toggle_response(app) {
                        Ok(visible) => log::info!("[SHORTCUT] Response visible: {}", visible),
                        Err(e) => log::error!("[SHORTCUT] Toggle failed: {}", e),
                    }
                }
            })
            .build(),
    )?;

    for (name, shortcut) in [(&config.capture, capture), (&config.toggle_response, toggle)] {
        match app.global_shortcut().register(shortcut) {
            Ok(()) => log::info!("[SHORTCUT] Registered {}", name),
            Err(e) => log::error!("[SHORTCUT] Could not register {}: {}", name, e),
        }
    }
    Ok(())
}
