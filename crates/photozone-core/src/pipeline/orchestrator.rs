use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::BotConfig;
use crate::error::Result;
use crate::io::naming::{StagingDirs, StagingPaths};
use crate::remote::{FaceRestorer, HttpFetcher, ReplicateClient, UrlFetcher};

use super::artifacts::ArtifactSet;
use super::transform::{background_sharpen, color_correct, finalize_and_save};
use super::types::{
    FailureReason, FileInfo, PhotoSource, PipelineResult, PipelineState, ProgressSink,
    ProgressStep,
};

/// Tracks the state of one run and logs each transition.
struct RunTracker {
    user_id: i64,
    state: PipelineState,
}

impl RunTracker {
    fn new(user_id: i64) -> Self {
        Self {
            user_id,
            state: PipelineState::Start,
        }
    }

    fn advance(&mut self, next: PipelineState) {
        debug_assert!(next > self.state, "state must move forward");
        info!(user_id = self.user_id, from = %self.state, to = %next, "Pipeline state changed");
        self.state = next;
    }

    fn fail(&mut self, reason: FailureReason) -> PipelineResult {
        error!(user_id = self.user_id, at = %self.state, reason = %reason, "Pipeline failed");
        self.state = PipelineState::Failed;
        PipelineResult::Failed(reason)
    }
}

/// Run a degrade-not-fail transform off the async executor. A panicked or
/// cancelled task degrades the same way a transform error does.
async fn run_degradable(transform: fn(&Path) -> PathBuf, input: PathBuf) -> PathBuf {
    let fallback = input.clone();
    match tokio::task::spawn_blocking(move || transform(&input)).await {
        Ok(out) => out,
        Err(e) => {
            error!(path = %fallback.display(), error = %e, "Transform task failed, keeping input");
            fallback
        }
    }
}

async fn report(progress: &dyn ProgressSink, step: ProgressStep) -> Result<()> {
    debug!(step = step.ordinal(), "Reporting progress");
    progress.update(&step.to_string()).await
}

/// The four-stage photo enhancement pipeline.
///
/// Runs for different users share nothing but the staging directories; each
/// run's files are keyed by user id.
pub struct PhotoPipeline {
    restorer: Arc<dyn FaceRestorer>,
    fetcher: Arc<dyn UrlFetcher>,
    dirs: StagingDirs,
}

impl PhotoPipeline {
    pub fn new(
        restorer: Arc<dyn FaceRestorer>,
        fetcher: Arc<dyn UrlFetcher>,
        dirs: StagingDirs,
    ) -> Self {
        Self {
            restorer,
            fetcher,
            dirs,
        }
    }

    /// Wire the Replicate client and HTTP fetcher from the configuration.
    pub fn from_config(config: &BotConfig, http: reqwest::Client) -> Self {
        let restorer = ReplicateClient::new(
            http.clone(),
            config.replicate_token.clone(),
            config.restore.clone(),
        );
        Self::new(
            Arc::new(restorer),
            Arc::new(HttpFetcher::new(http)),
            config.staging_dirs(),
        )
    }

    /// Process one user photo end to end.
    ///
    /// Stage failures come back as `Ok(PipelineResult::Failed)`. `Err` is
    /// reserved for unanticipated faults such as a failed source download or
    /// progress update. Staging files are removed in every case.
    pub async fn process_user_photo(
        &self,
        file_info: &FileInfo,
        user_id: i64,
        source: &dyn PhotoSource,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineResult> {
        let paths = self.dirs.for_user(user_id);
        let mut artifacts = ArtifactSet::new();
        let mut run = RunTracker::new(user_id);

        let outcome = self
            .run_stages(file_info, &paths, &mut run, &mut artifacts, source, progress)
            .await;

        let removed = artifacts.cleanup().await;
        debug!(user_id, removed, "Staging files cleaned up");
        if let Err(ref e) = outcome {
            error!(user_id, at = %run.state, error = %e, "Pipeline aborted");
        }
        outcome
    }

    async fn run_stages(
        &self,
        file_info: &FileInfo,
        paths: &StagingPaths,
        run: &mut RunTracker,
        artifacts: &mut ArtifactSet,
        source: &dyn PhotoSource,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineResult> {
        // Start -> Downloaded
        artifacts.record(&paths.source, PipelineState::Downloaded);
        source
            .download_file(&file_info.file_path, &paths.source)
            .await?;
        run.advance(PipelineState::Downloaded);
        report(progress, ProgressStep::ColorCorrection).await?;

        // Downloaded -> ColorCorrected
        let color_path = run_degradable(color_correct, paths.source.clone()).await;
        artifacts.record(&color_path, PipelineState::ColorCorrected);
        run.advance(PipelineState::ColorCorrected);
        report(progress, ProgressStep::FaceRestoration).await?;

        // ColorCorrected -> FaceRestored
        let face_url = match self.dispatch_restore(color_path).await {
            Some(url) => url,
            None => return Ok(run.fail(FailureReason::FaceEnhancement)),
        };
        run.advance(PipelineState::FaceRestored);
        report(progress, ProgressStep::BackgroundCorrection).await?;

        // FaceRestored -> BackgroundProcessed
        artifacts.record(&paths.codeformer, PipelineState::FaceRestored);
        let restored = self.fetcher.fetch(&face_url).await?;
        tokio::fs::write(&paths.codeformer, restored).await?;
        let sharpened = run_degradable(background_sharpen, paths.codeformer.clone()).await;
        artifacts.record(&sharpened, PipelineState::BackgroundProcessed);
        // The final stage re-reads the restored image from `face_url`; the
        // sharpened artifact is not part of the output.
        debug!(path = %sharpened.display(), "Background artifact produced");
        run.advance(PipelineState::BackgroundProcessed);
        report(progress, ProgressStep::PostProcessing).await?;

        // BackgroundProcessed -> Finalized
        match finalize_and_save(self.fetcher.as_ref(), &face_url, run.user_id, &self.dirs).await {
            Some(final_path) => {
                run.advance(PipelineState::Finalized);
                Ok(PipelineResult::Finished(final_path))
            }
            None => Ok(run.fail(FailureReason::FinalProcessing)),
        }
    }

    /// Dispatch the face restoration call as its own task and wait for it.
    /// Any error, including a panicked task, is logged and yields `None`.
    async fn dispatch_restore(&self, path: PathBuf) -> Option<String> {
        info!(path = %path.display(), "Starting face restoration");
        let restorer = Arc::clone(&self.restorer);
        let task = tokio::spawn(async move { restorer.restore_face(&path).await });

        match task.await {
            Ok(Ok(url)) => {
                info!(url = %url, "Face restoration finished");
                Some(url)
            }
            Ok(Err(e)) => {
                error!(error = %e, "Face restoration failed");
                None
            }
            Err(e) => {
                error!(error = %e, "Face restoration task failed");
                None
            }
        }
    }
}
