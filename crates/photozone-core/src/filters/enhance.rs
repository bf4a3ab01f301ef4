use image::{Rgb, RgbImage};

use crate::consts::{LUMA_B, LUMA_G, LUMA_R};
use crate::filters::smooth::smooth;

/// Blend `image` away from (or towards) a degenerate version of itself.
///
/// `out = degenerate + factor * (image - degenerate)`, clamped to 0..=255.
/// A factor of 1.0 returns the original, 0.0 returns the degenerate image.
fn blend(degenerate: &RgbImage, image: &RgbImage, factor: f32) -> RgbImage {
    let (w, h) = image.dimensions();
    RgbImage::from_fn(w, h, |x, y| {
        let d = degenerate.get_pixel(x, y).0;
        let s = image.get_pixel(x, y).0;
        let mix = |i: usize| {
            let dv = f32::from(d[i]);
            (dv + factor * (f32::from(s[i]) - dv)).round().clamp(0.0, 255.0) as u8
        };
        Rgb([mix(0), mix(1), mix(2)])
    })
}

/// Rounded BT.601 luminance of an 8-bit RGB pixel.
pub fn luma(px: &Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    let weighted = u32::from(r) * LUMA_R + u32::from(g) * LUMA_G + u32::from(b) * LUMA_B;
    ((weighted + 500) / 1000) as u8
}

/// Mean luminance of the whole image, rounded to the nearest level.
pub fn mean_luma(image: &RgbImage) -> u8 {
    let count = u64::from(image.width()) * u64::from(image.height());
    if count == 0 {
        return 0;
    }
    let total: u64 = image.pixels().map(|px| u64::from(luma(px))).sum();
    ((total as f64 / count as f64) + 0.5) as u8
}

/// Scale contrast around the mean gray level.
pub fn adjust_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let mean = mean_luma(image);
    let degenerate = RgbImage::from_pixel(image.width(), image.height(), Rgb([mean; 3]));
    blend(&degenerate, image, factor)
}

/// Scale saturation around the grayscale version of the image.
pub fn adjust_color(image: &RgbImage, factor: f32) -> RgbImage {
    let degenerate = RgbImage::from_fn(image.width(), image.height(), |x, y| {
        Rgb([luma(image.get_pixel(x, y)); 3])
    });
    blend(&degenerate, image, factor)
}

/// Scale sharpness around a smoothed copy of the image.
pub fn adjust_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    let degenerate = smooth(image);
    blend(&degenerate, image, factor)
}

/// Scale brightness around black.
pub fn adjust_brightness(image: &RgbImage, factor: f32) -> RgbImage {
    let degenerate = RgbImage::new(image.width(), image.height());
    blend(&degenerate, image, factor)
}
