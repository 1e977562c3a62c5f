//! xcap-backed display enumeration and frame grabbing.

use super::display::{Display, Point};
use super::source::CaptureSource;
use crate::error::CaptureError;
use image::RgbaImage;
use xcap::Monitor;

fn backend_err(what: &str, e: xcap::XCapError) -> CaptureError {
    CaptureError::Backend(format!("{}: {}", what, e))
}

/// Snapshot the current display layout in logical pixels. Called once per
/// capture.
pub fn enumerate_displays() -> Result<Vec<Display>, CaptureError> {
    let displays = monitor_geometry()?;
    #[cfg(target_os = "windows")]
    let displays = super::display::logical_layout(&displays);
    log::debug!("[CAPTURE] {} display(s): {:?}", displays.len(), displays);
    Ok(displays)
}

/// Convert the OS pointer position (physical pixels) to logical space.
pub fn cursor_to_logical(x: f64, y: f64) -> Result<Point, CaptureError> {
    let displays = monitor_geometry()?;
    #[cfg(target_os = "windows")]
    let point = super::display::physical_point_in_layout(&displays, x, y);
    #[cfg(not(target_os = "windows"))]
    let point = super::display::physical_to_logical(&displays, x, y);
    Ok(point)
}

/// Geometry as xcap reports it: logical on macOS and Linux, physical on
/// Windows.
fn monitor_geometry() -> Result<Vec<Display>, CaptureError> {
    let monitors = Monitor::all().map_err(|e| backend_err("monitor enumeration", e))?;
    let mut displays = Vec::with_capacity(monitors.len());
    for monitor in &monitors {
        displays.push(Display {
            id: monitor.id().map_err(|e| backend_err("monitor id", e))?,
            x: monitor.x().map_err(|e| backend_err("monitor x", e))?,
            y: monitor.y().map_err(|e| backend_err("monitor y", e))?,
            width: monitor.width().map_err(|e| backend_err("monitor width", e))?,
            height: monitor.height().map_err(|e| backend_err("monitor height", e))?,
            scale_factor: f64::from(
                monitor
                    .scale_factor()
                    .map_err(|e| backend_err("monitor scale", e))?,
            ),
            is_primary: monitor.is_primary().unwrap_or(false),
        });
    }
    Ok(displays)
}

/// One monitor as a capture source. The id is read once up front so that
/// picking never touches the backend again.
pub struct MonitorSource {
    display_id: u32,
    monitor: Monitor,
}

impl CaptureSource for MonitorSource {
    fn display_id(&self) -> u32 {
        self.display_id
    }

    fn grab(&self) -> Result<RgbaImage, CaptureError> {
        self.monitor
            .capture_image()
            .map_err(|e| backend_err("screen capture (check Screen Recording permission)", e))
    }
}

/// Enumerate capture sources, one per monitor. No pixels are read here.
pub fn capture_sources() -> Result<Vec<MonitorSource>, CaptureError> {
    let monitors = Monitor::all().map_err(|e| backend_err("monitor enumeration", e))?;
    monitors
        .into_iter()
        .map(|monitor| {
            let display_id = monitor.id().map_err(|e| backend_err("monitor id", e))?;
            Ok(MonitorSource { display_id, monitor })
        })
        .collect()
}
