use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::types::PipelineState;

/// An intermediate file and the state whose stage produced it.
#[derive(Clone, Debug, PartialEq, Eq)]
struct StageArtifact {
    path: PathBuf,
    stage: PipelineState,
}

/// Files created during one run, in creation order.
///
/// A degraded stage may record the path of its input again; cleanup treats
/// the second removal as a missing file.
#[derive(Debug, Default)]
pub struct ArtifactSet {
    artifacts: Vec<StageArtifact>,
}

impl ArtifactSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, path: impl Into<PathBuf>, stage: PipelineState) {
        self.artifacts.push(StageArtifact {
            path: path.into(),
            stage,
        });
    }

    /// Remove every recorded file in creation order. Missing files are
    /// skipped silently, other errors are logged and do not stop the sweep.
    /// Returns the number of files actually removed.
    pub async fn cleanup(&mut self) -> usize {
        let mut removed = 0;
        for artifact in self.artifacts.drain(..) {
            if remove_if_exists(&artifact).await {
                removed += 1;
            }
        }
        removed
    }
}

async fn remove_if_exists(artifact: &StageArtifact) -> bool {
    let path = artifact.path.display();
    match tokio::fs::remove_file(&artifact.path).await {
        Ok(()) => {
            debug!(path = %path, stage = %artifact.stage, "Removed staging file");
            true
        }
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            warn!(
                path = %path,
                stage = %artifact.stage,
                error = %e,
                "Failed to remove staging file"
            );
            false
        }
    }
}
