//! Capture Source Picker — match a display to its capture source.

use super::display::Display;
use crate::error::CaptureError;
use image::RgbaImage;

/// A backend handle for one display's full-frame raster.
///
/// Grabbing is deferred until after the source has been picked so that only
/// the active display is ever read back.
pub trait CaptureSource {
    /// Identifier of the display this source renders.
    fn display_id(&self) -> u32;

    /// Read back the full display frame in physical pixels.
    fn grab(&self) -> Result<RgbaImage, CaptureError>;
}

/// Pick the source whose display id equals `display.id`.
///
/// A mismatch between the windowing layer's view of the displays and the
/// backend's is surfaced as `SourceNotFound`. Falling back to any other
/// source would silently capture the wrong monitor.
pub fn pick_source<'a, S: CaptureSource>(
    sources: &'a [S],
    display: &Display,
) -> Result<&'a S, CaptureError> {
    sources
        .iter()
        .find(|s| s.display_id() == display.id)
        .ok_or_else(|| {
            let available: Vec<u32> = sources.iter().map(|s| s.display_id()).collect();
            log::error!(
                "[CAPTURE] No source for display {} (backend has {:?})",
                display.id, available
            );
            CaptureError::SourceNotFound {
                display_id: display.id,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct FakeSource {
        id: u32,
        grabs: Cell<u32>,
    }

    impl FakeSource {
        fn new(id: u32) -> Self {
            Self { id, grabs: Cell::new(0) }
        }
    }

    impl CaptureSource for FakeSource {
        fn display_id(&self) -> u32 {
            self.id
        }

        fn grab(&self) -> Result<RgbaImage, CaptureError> {
            self.grabs.set(self.grabs.get() + 1);
            Ok(RgbaImage::new(4, 4))
        }
    }

    fn display(id: u32) -> Display {
        Display {
            id,
            x: 0,
            y: 0,
            width: 800,
            height: 600,
            scale_factor: 1.0,
            is_primary: false,
        }
    }

    #[test]
    fn picks_exact_id_match() {
        let sources = vec![FakeSource::new(10), FakeSource::new(20), FakeSource::new(30)];
        let picked = pick_source(&sources, &display(20)).unwrap();
        assert_eq!(picked.display_id(), 20);
    }

    #[test]
    fn missing_id_is_source_not_found_without_grabbing() {
        let sources = vec![FakeSource::new(10), FakeSource::new(30)];
        let err = pick_source(&sources, &display(20)).unwrap_err();
        assert!(matches!(err, CaptureError::SourceNotFound { display_id: 20 }));
        assert!(sources.iter().all(|s| s.grabs.get() == 0));
    }

    #[test]
    fn does_not_default_to_first_source() {
        let sources = vec![FakeSource::new(1)];
        assert!(pick_source(&sources, &display(2)).is_err());
    }

    #[test]
    fn empty_source_list_is_source_not_found() {
        let sources: Vec<FakeSource> = Vec::new();
        let err = pick_source(&sources, &display(0)).unwrap_err();
        assert!(matches!(err, CaptureError::SourceNotFound { display_id: 0 }));
    }
}
