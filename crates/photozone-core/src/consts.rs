/// Contrast factor applied first during color correction.
pub const COLOR_CORRECT_CONTRAST: f32 = 1.2;

/// Saturation factor applied second during color correction.
pub const COLOR_CORRECT_SATURATION: f32 = 1.4;

/// Sharpness factor applied last during color correction.
pub const COLOR_CORRECT_SHARPNESS: f32 = 1.5;

/// Sharpness factor of the background sharpening stage.
pub const BACKGROUND_SHARPNESS: f32 = 1.1;

/// Brightness factor of the final post-processing stage.
pub const FINAL_BRIGHTNESS: f32 = 1.05;

/// JPEG quality of the final output image.
pub const FINAL_JPEG_QUALITY: u8 = 95;

/// JPEG quality for intermediate stage artifacts.
pub const ARTIFACT_JPEG_QUALITY: u8 = 75;

/// ITU-R BT.601 luminance coefficients, in the fixed-point form used for
/// 8-bit RGB to grayscale conversion (sum = 1000).
pub const LUMA_R: u32 = 299;
pub const LUMA_G: u32 = 587;
pub const LUMA_B: u32 = 114;

/// Weights of the 3x3 smoothing kernel behind the sharpness operator.
/// Center weight first, then the eight neighbours.
pub const SMOOTH_CENTER_WEIGHT: u32 = 5;
pub const SMOOTH_NEIGHBOUR_WEIGHT: u32 = 1;
pub const SMOOTH_KERNEL_SUM: u32 = 13;

/// CodeFormer fidelity weight sent with every face restoration call.
pub const RESTORE_FIDELITY: f32 = 0.7;

/// Background enhancement flag sent with every face restoration call.
pub const RESTORE_BACKGROUND_ENHANCE: bool = false;

/// Upscale factor sent with every face restoration call.
pub const RESTORE_UPSCALE: u32 = 1;

/// Largest image sent inline as a `data:` URI. Bigger files are uploaded
/// through the Replicate Files API and passed by URL.
pub const INLINE_IMAGE_MAX_BYTES: usize = 256 * 1024;

/// CodeFormer model version on Replicate.
pub const DEFAULT_CODEFORMER_VERSION: &str =
    "7de2ea26c616d5bf2245ad0d5e24f0ff9a6204578a5c876db53142edd9d2cd56";

/// Interval between prediction status polls.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

pub const DEFAULT_REPLICATE_API_BASE: &str = "https://api.replicate.com";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub const DEFAULT_INPUT_DIR: &str = "input_photos";
pub const DEFAULT_OUTPUT_DIR: &str = "output_photos";

/// Environment variable holding the Telegram bot token.
pub const ENV_TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";

/// Environment variable holding the Replicate API token.
pub const ENV_REPLICATE_TOKEN: &str = "REPLICATE_API_TOKEN";

/// Number of progress steps reported to the user.
pub const PIPELINE_STEP_COUNT: u8 = 4;

/// Prefix shared by every user-facing failure message.
pub const FAILURE_PREFIX: &str = "\u{274c}";
