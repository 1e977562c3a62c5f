//! Region Cropper — cut the selection out of a full-display frame and
//! encode it once as PNG.

use super::scale::PhysicalRect;
use crate::error::CaptureError;
use base64::Engine;
use image::{DynamicImage, ImageFormat, RgbaImage};

/// The cropped region, encoded once as PNG.
///
/// The transfer form (PNG bytes / base64) and the inline form (data URL)
/// are two views of the same encoded crop.
#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    width: u32,
    height: u32,
    png: Vec<u8>,
}

impl std::fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

impl CapturedImage {
    /// Wrap already-encoded PNG bytes.
    pub fn from_png(width: u32, height: u32, png: Vec<u8>) -> Self {
        Self { width, height, png }
    }

    /// Encode an RGBA raster as PNG.
    pub fn encode(raster: RgbaImage) -> Result<Self, CaptureError> {
        let (width, height) = raster.dimensions();
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(raster)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(Self { width, height, png })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Lossless transfer form.
    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.png)
    }

    /// Inline-displayable form, usable as an `<img src>` or an `image_url`.
    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }

    pub fn write_png(&self, path: &std::path::Path) -> std::io::Result<()> {
        std::fs::write(path, &self.png)
    }
}

/// Clamp `rect` to a `frame_width` × `frame_height` raster.
///
/// Selection-edge truncation can push a rectangle a pixel past the frame;
/// that is trimmed rather than treated as an error.
pub fn clamp_to_frame(rect: &PhysicalRect, frame_width: u32, frame_height: u32) -> PhysicalRect {
    let x = rect.x.min(frame_width);
    let y = rect.y.min(frame_height);
    PhysicalRect {
        x,
        y,
        width: rect.width.min(frame_width - x),
        height: rect.height.min(frame_height - y),
    }
}

/// Crop `frame` to `rect` (clamped) and encode the result.
pub fn crop(frame: &RgbaImage, rect: &PhysicalRect) -> Result<CapturedImage, CaptureError> {
    let start = std::time::Instant::now();
    let (frame_w, frame_h) = frame.dimensions();
    let clamped = clamp_to_frame(rect, frame_w, frame_h);
    if clamped != *rect {
        log::debug!(
            "[CAPTURE] Clamped {:?} to {:?} (frame {}x{})",
            rect, clamped, frame_w, frame_h
        );
    }
    if clamped.is_empty() {
        return Err(CaptureError::InvalidSelection);
    }

    let cropped =
        image::imageops::crop_imm(frame, clamped.x, clamped.y, clamped.width, clamped.height)
            .to_image();
    let crop_ms = start.elapsed().as_millis();

    let encode_start = std::time::Instant::now();
    let image = CapturedImage::encode(cropped)?;
    log::info!(
        "[CAPTURE] Region crop: {}ms, PNG encode: {}ms ({} bytes, {}x{})",
        crop_ms,
        encode_start.elapsed().as_millis(),
        image.png.len(),
        image.width,
        image.height
    );

    Ok(image)
}
