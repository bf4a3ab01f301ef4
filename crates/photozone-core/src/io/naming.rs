//! Per-user staging file names.
//!
//! Concurrent runs for different users never share a file because every name
//! is keyed by the user id. Two runs for the same user do collide; nothing
//! here guards against that.

use std::path::{Path, PathBuf};

const JPG_EXT: &str = ".jpg";
const COLOR_MARKER: &str = "_color";
const BG_SHARP_MARKER: &str = "_bg_sharp";
const CODEFORMER_MARKER: &str = "_codeformer";
const FINAL_MARKER: &str = "_final";

/// Input and output staging directories.
#[derive(Clone, Debug)]
pub struct StagingDirs {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// The fixed-name files of one run. The color and background artifacts are
/// named after their input, see `color_corrected_path` and
/// `background_sharpened_path`; the final output comes from
/// `StagingDirs::final_output_path`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagingPaths {
    /// `{input}/{user}.jpg`
    pub source: PathBuf,
    /// `{input}/{user}_codeformer.jpg`
    pub codeformer: PathBuf,
}

impl StagingDirs {
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
        }
    }

    pub fn for_user(&self, user_id: i64) -> StagingPaths {
        StagingPaths {
            source: self.input_dir.join(format!("{user_id}{JPG_EXT}")),
            codeformer: self
                .input_dir
                .join(format!("{user_id}{CODEFORMER_MARKER}{JPG_EXT}")),
        }
    }

    pub fn final_output_path(&self, user_id: i64) -> PathBuf {
        self.output_dir
            .join(format!("{user_id}{FINAL_MARKER}{JPG_EXT}"))
    }
}

/// Insert `marker` before the `.jpg` extension of the file name, or append
/// `marker.jpg` when the name has no such extension.
fn with_marker(file_name: &str, marker: &str) -> String {
    match file_name.strip_suffix(JPG_EXT) {
        Some(stem) => format!("{stem}{marker}{JPG_EXT}"),
        None => format!("{file_name}{marker}{JPG_EXT}"),
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `{stem}.jpg` -> `{stem}_color.jpg`
pub fn color_corrected_path(path: &Path) -> PathBuf {
    path.with_file_name(with_marker(&file_name_of(path), COLOR_MARKER))
}

/// `{stem}.jpg` -> `{stem}_bg_sharp.jpg`, with the `_color` and
/// `_codeformer` stage markers removed.
pub fn background_sharpened_path(path: &Path) -> PathBuf {
    let name = with_marker(&file_name_of(path), BG_SHARP_MARKER)
        .replace(COLOR_MARKER, "")
        .replace(CODEFORMER_MARKER, "");
    path.with_file_name(name)
}
