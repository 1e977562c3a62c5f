//! SnapLens — snip a screen region, stream a vision model's answer.
//!
//! Core domains build without the desktop shell:
//!   - capture — display resolution, coordinate scaling, source pick, crop
//!   - llm     — prompt selection + Groq streaming client
//!   - relay   — request lifecycle, replay session, cancellation
//!   - config  — .env / environment / keychain
//!
//! With `--features desktop` this also wires the Tauri app shell. No
//! business logic lives in the shell modules:
//!   - commands.rs  — invoke() handlers
//!   - pipeline.rs  — capture → prompt → relay orchestration
//!   - windows.rs   — overlay / response windows
//!   - shortcuts.rs — global hot-keys
//!   - tray.rs      — tray icon + menu

pub mod capture;
pub mod config;
pub mod error;
pub mod llm;
pub mod relay;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
mod pipeline;
#[cfg(feature = "desktop")]
mod shortcuts;
#[cfg(feature = "desktop")]
mod tray;
#[cfg(feature = "desktop")]
mod windows;

/// Entry point — called by the `snaplens` binary.
#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use std::sync::Arc;

    config::load_env_files();
    env_logger::init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("[STARTUP] {}", e);
            eprintln!("[STARTUP] Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let client = match llm::GroqClient::new(config.inference.clone()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("[STARTUP] Could not build HTTP client: {}", e);
            std::process::exit(2);
        }
    };
    if !client.has_api_key() {
        log::warn!("[STARTUP] No Groq API key — requests will fail until one is saved");
    }
    let relay = relay::StreamingRelay::new(client.clone());
    let shortcut_config = config.shortcuts.clone();

    let app = tauri::Builder::default()
        .manage(config)
        .manage(client)
        .manage(relay)
        .manage(pipeline::ResponseState::new())
        .invoke_handler(tauri::generate_handler![
            commands::capture_region,
            commands::cancel_overlay,
            commands::start_capture,
            commands::close_response,
            commands::toggle_response,
            commands::replay_last,
            commands::get_transcript,
            commands::get_last_capture,
            commands::copy_to_clipboard,
            commands::save_api_key,
            commands::has_api_key,
        ])
        .on_window_event(|window, event| {
            use tauri::Manager;
            let relay = window.state::<relay::StreamingRelay>();
            pipeline::on_window_event(window.label(), event, &relay);
        })
        .setup(move |app| {
            log::info!("SnapLens starting up");

            #[cfg(target_os = "macos")]
            app.set_activation_policy(tauri::ActivationPolicy::Accessory);

            tray::setup_tray(app.handle())?;
            if let Err(e) = shortcuts::register(app.handle(), &shortcut_config) {
                log::error!("[SHORTCUT] Hot-keys disabled: {}", e);
            }

            log::info!("System tray initialized — ready for captures");
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("Error building SnapLens");

    // Closing the last window must not quit: the tray keeps the app alive.
    app.run(|_app, event| {
        if let tauri::RunEvent::ExitRequested { api, code, .. } = event {
            if code.is_none() {
                api.prevent_exit();
            }
        }
    });
}
