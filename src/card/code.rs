//! QR code images for card links.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Luma, RgbaImage};
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeError {
    #[error("failed to encode {link:?} as a QR code: {reason}")]
    Encode { link: String, reason: String },
    #[error("code image size must be positive")]
    EmptySize,
}

/// Render `link` as a `size` x `size` QR code with a quiet zone.
pub fn render_code(link: &str, size: u32) -> Result<RgbaImage, CodeError> {
    if size == 0 {
        return Err(CodeError::EmptySize);
    }
    let code = QrCode::with_error_correction_level(link.as_bytes(), EcLevel::M).map_err(|err| {
        CodeError::Encode {
            link: link.to_string(),
            reason: err.to_string(),
        }
    })?;
    let modules = code
        .render::<Luma<u8>>()
        .quiet_zone(true)
        .module_dimensions(1, 1)
        .build();
    let rgba = DynamicImage::ImageLuma8(modules).to_rgba8();
    Ok(imageops::resize(&rgba, size, size, FilterType::Nearest))
}
