mod artifacts;
mod orchestrator;
pub mod transform;
mod types;

pub use artifacts::ArtifactSet;
pub use orchestrator::PhotoPipeline;
pub use types::{
    FailureReason, FileInfo, PhotoSource, PipelineResult, PipelineState, ProgressSink,
    ProgressStep,
};
