use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;

use crate::error::Result;

/// Load an image file as 8-bit RGB.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    let img = image::open(path)?;
    Ok(img.to_rgb8())
}

/// Decode an in-memory image (any supported format) as 8-bit RGB.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Encode as baseline JPEG at the given quality (1-100).
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder.encode_image(image)?;
    Ok(buf)
}

/// Encode fully in memory, then write, so a failed encode leaves no file behind.
pub fn save_jpeg(image: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let bytes = encode_jpeg(image, quality)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
