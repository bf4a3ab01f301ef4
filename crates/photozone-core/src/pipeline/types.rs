use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::consts::{FAILURE_PREFIX, PIPELINE_STEP_COUNT};
use crate::error::Result;

/// Where a pipeline run currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Start,
    Downloaded,
    ColorCorrected,
    FaceRestored,
    BackgroundProcessed,
    Finalized,
    Failed,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "Start"),
            Self::Downloaded => write!(f, "Downloaded"),
            Self::ColorCorrected => write!(f, "Color corrected"),
            Self::FaceRestored => write!(f, "Face restored"),
            Self::BackgroundProcessed => write!(f, "Background processed"),
            Self::Finalized => write!(f, "Finalized"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

/// User-visible progress step, numbered 1 to 4.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProgressStep {
    ColorCorrection,
    FaceRestoration,
    BackgroundCorrection,
    PostProcessing,
}

impl ProgressStep {
    pub fn ordinal(self) -> u8 {
        match self {
            Self::ColorCorrection => 1,
            Self::FaceRestoration => 2,
            Self::BackgroundCorrection => 3,
            Self::PostProcessing => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ColorCorrection => "Downloading and color-correcting...",
            Self::FaceRestoration => "Neural network is restoring the face (CodeFormer)...",
            Self::BackgroundCorrection => "Neural network is correcting the background...",
            Self::PostProcessing => "Final post-processing...",
        }
    }
}

impl std::fmt::Display for ProgressStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "\u{23f3} {}/{} {}",
            self.ordinal(),
            PIPELINE_STEP_COUNT,
            self.label()
        )
    }
}

/// Why a run ended in `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    FaceEnhancement,
    FinalProcessing,
}

impl FailureReason {
    pub fn reason(self) -> &'static str {
        match self {
            Self::FaceEnhancement => "face enhancement failed",
            Self::FinalProcessing => "final processing failed",
        }
    }

    /// Text sent to the user, always starting with the failure marker.
    pub fn user_message(self) -> String {
        let detail = match self {
            Self::FaceEnhancement => "Neural network error at the face enhancement stage.",
            Self::FinalProcessing => "Critical error: could not produce the final image.",
        };
        format!("{FAILURE_PREFIX} {detail}")
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.reason())
    }
}

/// Terminal value of one run. Intermediate artifacts never appear here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineResult {
    Finished(PathBuf),
    Failed(FailureReason),
}

impl PipelineResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Finished(_))
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            Self::Finished(path) => Some(path),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            Self::Finished(_) => None,
            Self::Failed(reason) => Some(*reason),
        }
    }
}

/// Reference to the user's photo on the messaging platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    pub file_id: String,
    /// Platform-side path used to download the file.
    pub file_path: String,
}

/// The messaging platform's file download capability.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn download_file(&self, file_path: &str, dest: &Path) -> Result<()>;
}

/// A single progress message, edited in place for the whole run.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn update(&self, text: &str) -> Result<()>;
}
