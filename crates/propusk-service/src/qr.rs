//! QR code rendering for formed passes.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use propusk_core::{Error, Result};
use qrcode::QrCode;

/// Smallest edge of the rendered image, in pixels.
const MIN_EDGE: u32 = 256;

/// Encode `payload` as a QR code and return the PNG bytes.
pub fn render_png(payload: &str) -> Result<Vec<u8>> {
  let code = QrCode::new(payload.as_bytes())
    .map_err(|e| Error::Internal(format!("qr encode: {e}")))?;
  let pixels = code
    .render::<Luma<u8>>()
    .min_dimensions(MIN_EDGE, MIN_EDGE)
    .build();

  let mut png = Vec::new();
  DynamicImage::ImageLuma8(pixels)
    .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
    .map_err(|e| Error::Internal(format!("png encode: {e}")))?;
  Ok(png)
}
