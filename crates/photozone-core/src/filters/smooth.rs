use image::{Rgb, RgbImage};

use crate::consts::{SMOOTH_CENTER_WEIGHT, SMOOTH_KERNEL_SUM, SMOOTH_NEIGHBOUR_WEIGHT};

/// Apply the 3x3 smoothing kernel `[1 1 1; 1 5 1; 1 1 1] / 13`.
///
/// The one-pixel border is copied unchanged, so images narrower or shorter
/// than three pixels come back as an exact copy.
pub fn smooth(image: &RgbImage) -> RgbImage {
    let (w, h) = image.dimensions();
    let mut out = image.clone();
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut sums = [0u32; 3];
            for dy in 0..3 {
                for dx in 0..3 {
                    let weight = if dx == 1 && dy == 1 {
                        SMOOTH_CENTER_WEIGHT
                    } else {
                        SMOOTH_NEIGHBOUR_WEIGHT
                    };
                    let px = image.get_pixel(x + dx - 1, y + dy - 1);
                    for (sum, &channel) in sums.iter_mut().zip(px.0.iter()) {
                        *sum += u32::from(channel) * weight;
                    }
                }
            }
            let half = SMOOTH_KERNEL_SUM / 2;
            out.put_pixel(
                x,
                y,
                Rgb([
                    ((sums[0] + half) / SMOOTH_KERNEL_SUM) as u8,
                    ((sums[1] + half) / SMOOTH_KERNEL_SUM) as u8,
                    ((sums[2] + half) / SMOOTH_KERNEL_SUM) as u8,
                ]),
            );
        }
    }

    out
}
