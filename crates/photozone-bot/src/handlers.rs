use std::sync::Arc;

use anyhow::{Context, Result};
use photozone_core::consts::FAILURE_PREFIX;
use photozone_core::pipeline::{PhotoPipeline, PipelineResult};
use tracing::{error, info, warn};

use crate::progress::MessageProgress;
use crate::telegram::{Message, TelegramClient, Update};

pub const GREETING: &str = "\
\u{1f916} Smart City Photo Zone \u{1f4f8}

Hi! You have just connected to our professional camera. Your smartphone is the remote control!

Ready for the perfect shot?

1. Look at the screen: you see a live preview with the main landmark.

2. Pick a mode:

    \u{2728} AI Magic: turn into a batyr or a cyberpunk character.

    \u{1f5bc}\u{fe0f} Perfect Shot: get a crystal clear high-resolution photo with face and background enhancement.

3. Take the picture! Your photo is processed by AI right away and sent back to you.

Send a photo to start \u{1f447}";

pub const PIPELINE_START_TEXT: &str = "\u{23f3} 0/4 Starting the processing pipeline...";

pub const SUCCESS_CAPTION: &str = "\u{2728} Done! Your photo went through the full 4-step \
processing: color correction, face enhancement, background correction and final tuning.";

/// Shared by every handler task.
pub struct BotContext {
    pub client: TelegramClient,
    pub pipeline: PhotoPipeline,
}

/// Route one update. Photo messages get their own task so a slow pipeline run
/// never holds up other users.
pub async fn dispatch(ctx: Arc<BotContext>, update: Update) {
    let Some(message) = update.message else {
        return;
    };

    if message.is_command("/start") {
        if let Err(e) = ctx.client.send_message(message.chat.id, GREETING).await {
            error!(chat_id = message.chat.id, error = %e, "Failed to send greeting");
        }
    } else if !message.photo.is_empty() {
        tokio::spawn(async move {
            let user_id = message.user_id();
            if let Err(e) = handle_photo(&ctx, &message).await {
                error!(user_id, error = %e, "Photo handler failed");
            }
        });
    }
}

/// Run the pipeline for a photo message and deliver the outcome.
pub async fn handle_photo(ctx: &BotContext, message: &Message) -> Result<()> {
    let chat_id = message.chat.id;
    let user_id = message.user_id();
    let photo = message
        .largest_photo()
        .context("message carries no photo")?;
    info!(user_id, file_id = %photo.file_id, "Received photo");

    let status = ctx.client.send_message(chat_id, PIPELINE_START_TEXT).await?;
    let file_info = ctx.client.get_file(&photo.file_id).await?;
    let progress = MessageProgress::new(ctx.client.clone(), chat_id, status.message_id);

    let result = match ctx
        .pipeline
        .process_user_photo(&file_info, user_id, &ctx.client, &progress)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            error!(user_id, error = %e, "Critical error in the photo pipeline");
            ctx.client
                .edit_message_text(chat_id, status.message_id, &unexpected_failure_text())
                .await?;
            return Ok(());
        }
    };

    deliver(&ctx.client, chat_id, status.message_id, user_id, result).await
}

/// Replace the progress message with the pipeline outcome. The progress
/// message is removed best-effort; the outcome is sent either way.
async fn deliver(
    client: &TelegramClient,
    chat_id: i64,
    status_message_id: i64,
    user_id: i64,
    result: PipelineResult,
) -> Result<()> {
    if let Err(e) = client.delete_message(chat_id, status_message_id).await {
        warn!(user_id, error = %e, "Could not delete the progress message");
    }
    match result {
        PipelineResult::Finished(path) => {
            client.send_photo(chat_id, &path, SUCCESS_CAPTION).await?;
            info!(user_id, path = %path.display(), "Sent processed photo");
        }
        PipelineResult::Failed(reason) => {
            client.send_message(chat_id, &reason.user_message()).await?;
        }
    }
    Ok(())
}

fn unexpected_failure_text() -> String {
    format!("{FAILURE_PREFIX} An unexpected error occurred in the processing pipeline.")
}
