use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use photozone_core::config::BotConfig;
use photozone_core::consts::PIPELINE_STEP_COUNT;
use photozone_core::pipeline::{FileInfo, PhotoPipeline, PhotoSource, PipelineResult};

use crate::progress::BarProgress;

#[derive(Args)]
pub struct ProcessArgs {
    /// Photo to enhance (JPEG or PNG)
    pub photo: PathBuf,

    /// User id used to name the staging files
    #[arg(long, default_value = "0")]
    pub user_id: i64,

    /// Copy the final image here as well
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Serves photos straight from the local filesystem.
struct LocalPhotoSource;

#[async_trait]
impl PhotoSource for LocalPhotoSource {
    async fn download_file(&self, file_path: &str, dest: &Path) -> photozone_core::error::Result<()> {
        tokio::fs::copy(file_path, dest).await?;
        Ok(())
    }
}

/// Run the full pipeline on a local photo, without the bot.
pub async fn run(args: &ProcessArgs, config: &BotConfig) -> Result<()> {
    config.validate_restore().context("Invalid configuration")?;
    config
        .ensure_dirs()
        .context("Failed to create staging directories")?;

    let file_info = FileInfo {
        file_id: args.photo.display().to_string(),
        file_path: args.photo.display().to_string(),
    };
    let pipeline = PhotoPipeline::from_config(config, reqwest::Client::new());

    let pb = ProgressBar::new(u64::from(PIPELINE_STEP_COUNT));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:50} [{bar:20}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let progress = BarProgress::new(pb.clone());

    let result = pipeline
        .process_user_photo(&file_info, args.user_id, &LocalPhotoSource, &progress)
        .await
        .with_context(|| format!("Failed to process {}", args.photo.display()))?;

    match result {
        PipelineResult::Finished(path) => {
            pb.finish_with_message("Done");
            if let Some(ref out) = args.output {
                std::fs::copy(&path, out)
                    .with_context(|| format!("Failed to copy result to {}", out.display()))?;
                println!("\nOutput saved to {}", out.display());
            } else {
                println!("\nOutput saved to {}", path.display());
            }
            Ok(())
        }
        PipelineResult::Failed(reason) => {
            pb.abandon_with_message(reason.user_message());
            bail!("pipeline failed: {reason}")
        }
    }
}
