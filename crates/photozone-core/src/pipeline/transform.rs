//! Local image transforms used by the pipeline stages.
//!
//! `color_correct` and `background_sharpen` degrade instead of failing: on any
//! decode or encode error they log and hand back the input path so the run
//! continues with the unmodified image. `finalize_and_save` is the last stage
//! and fails hard by returning `None`.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::consts::{
    ARTIFACT_JPEG_QUALITY, BACKGROUND_SHARPNESS, COLOR_CORRECT_CONTRAST, COLOR_CORRECT_SATURATION,
    COLOR_CORRECT_SHARPNESS, FINAL_BRIGHTNESS, FINAL_JPEG_QUALITY,
};
use crate::error::Result;
use crate::filters::enhance::{adjust_brightness, adjust_color, adjust_contrast, adjust_sharpness};
use crate::io::image_io::{decode_rgb, encode_jpeg, load_rgb, save_jpeg};
use crate::io::naming::{background_sharpened_path, color_corrected_path, StagingDirs};
use crate::remote::UrlFetcher;

/// Contrast x1.2, then saturation x1.4, then sharpness x1.5.
pub fn color_correct(path: &Path) -> PathBuf {
    info!(path = %path.display(), "Applying color correction");
    match try_color_correct(path) {
        Ok(out) => out,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Color correction failed, keeping original");
            path.to_path_buf()
        }
    }
}

fn try_color_correct(path: &Path) -> Result<PathBuf> {
    let img = load_rgb(path)?;
    let img = adjust_contrast(&img, COLOR_CORRECT_CONTRAST);
    let img = adjust_color(&img, COLOR_CORRECT_SATURATION);
    let img = adjust_sharpness(&img, COLOR_CORRECT_SHARPNESS);

    let out = color_corrected_path(path);
    save_jpeg(&img, &out, ARTIFACT_JPEG_QUALITY)?;
    Ok(out)
}

/// Stand-in for AI background enhancement: sharpness x1.1.
pub fn background_sharpen(path: &Path) -> PathBuf {
    info!(path = %path.display(), "Sharpening background");
    match try_background_sharpen(path) {
        Ok(out) => out,
        Err(e) => {
            error!(path = %path.display(), error = %e, "Background sharpening failed, keeping original");
            path.to_path_buf()
        }
    }
}

fn try_background_sharpen(path: &Path) -> Result<PathBuf> {
    let img = load_rgb(path)?;
    let img = adjust_sharpness(&img, BACKGROUND_SHARPNESS);

    let out = background_sharpened_path(path);
    save_jpeg(&img, &out, ARTIFACT_JPEG_QUALITY)?;
    Ok(out)
}

/// Brightness x1.05 applied to in-memory image bytes, re-encoded as JPEG q95.
pub fn post_process_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let img = decode_rgb(bytes)?;
    let img = adjust_brightness(&img, FINAL_BRIGHTNESS);
    encode_jpeg(&img, FINAL_JPEG_QUALITY)
}

/// Fetch `url`, post-process it and write `{output}/{user_id}_final.jpg`.
///
/// Returns `None` on any fetch, decode, encode or write failure. Nothing is
/// written unless encoding succeeded.
pub async fn finalize_and_save(
    fetcher: &dyn UrlFetcher,
    url: &str,
    user_id: i64,
    dirs: &StagingDirs,
) -> Option<PathBuf> {
    info!(user_id, url, "Final post-processing");
    match try_finalize(fetcher, url, user_id, dirs).await {
        Ok(path) => {
            info!(user_id, path = %path.display(), "Final photo saved");
            Some(path)
        }
        Err(e) => {
            warn!(user_id, url, error = %e, "Final post-processing failed");
            None
        }
    }
}

async fn try_finalize(
    fetcher: &dyn UrlFetcher,
    url: &str,
    user_id: i64,
    dirs: &StagingDirs,
) -> Result<PathBuf> {
    let bytes = fetcher.fetch(url).await?;
    let encoded = tokio::task::spawn_blocking(move || post_process_bytes(&bytes)).await??;

    let final_path = dirs.final_output_path(user_id);
    tokio::fs::write(&final_path, encoded).await?;
    Ok(final_path)
}
