//! Build script for SnapLens.
//!
//! Only the desktop shell needs Tauri's generated context; the core
//! library builds with no build-time work.

fn main() {
    #[cfg(feature = "desktop")]
    tauri_build::build();
}
