//! QR code PNG renderer for authentication links.
//!
//! Encodes the link with `qrcode` and rasterizes the module grid into a
//! grayscale PNG with `image`.

use bytes::Bytes;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;

use crate::traits::{ArtifactRenderer, RenderError};

/// Pixels per QR module.
pub const DEFAULT_MODULE_PX: u32 = 8;

/// Blank modules around the code (the minimum the QR standard allows).
const QUIET_ZONE: u32 = 4;

/// Renders payloads as QR code PNGs.
#[derive(Debug, Clone, Copy)]
pub struct QrPngRenderer {
    module_px: u32,
    ec_level: EcLevel,
}

impl QrPngRenderer {
    pub fn new() -> Self {
        Self {
            module_px: DEFAULT_MODULE_PX,
            ec_level: EcLevel::M,
        }
    }

    /// Set pixels per module (minimum 1).
    pub fn with_module_px(mut self, module_px: u32) -> Self {
        self.module_px = module_px.max(1);
        self
    }

    fn rasterize(&self, code: &QrCode) -> GrayImage {
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let side = (modules + 2 * QUIET_ZONE) * self.module_px;
        let module_px = self.module_px;

        GrayImage::from_fn(side, side, |x, y| {
            let mx = (x / module_px).checked_sub(QUIET_ZONE);
            let my = (y / module_px).checked_sub(QUIET_ZONE);
            let dark = match (mx, my) {
                (Some(mx), Some(my)) if mx < modules && my < modules => {
                    colors[(my * modules + mx) as usize] == Color::Dark
                }
                _ => false,
            };
            if dark {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        })
    }
}

impl Default for QrPngRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactRenderer for QrPngRenderer {
    fn render(&self, payload: &str) -> Result<Bytes, RenderError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), self.ec_level)
            .map_err(|e| match e {
                QrError::DataTooLong => RenderError::PayloadTooLong(payload.len()),
                other => RenderError::Encode(other.to_string()),
            })?;

        let mut png = Cursor::new(Vec::new());
        self.rasterize(&code)
            .write_to(&mut png, ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(Bytes::from(png.into_inner()))
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn content_type(&self) -> &'static str {
        "image/png"
    }
}
