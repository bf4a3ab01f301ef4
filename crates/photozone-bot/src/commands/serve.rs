use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use photozone_core::config::BotConfig;
use photozone_core::pipeline::PhotoPipeline;
use tracing::{info, warn};

use crate::handlers::{self, BotContext};
use crate::summary::print_bot_summary;
use crate::telegram::TelegramClient;

/// Long-poll timeout passed to `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Pause after a failed `getUpdates` call.
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(3);

/// Start the bot and poll for updates until Ctrl-C.
pub async fn run(config: &BotConfig) -> Result<()> {
    config.validate().context("Invalid configuration")?;
    config
        .ensure_dirs()
        .context("Failed to create staging directories")?;
    print_bot_summary(config);

    let http = reqwest::Client::new();
    let client = TelegramClient::new(http.clone(), &config.telegram_api_base, &config.telegram_token);
    let ctx = Arc::new(BotContext {
        client: client.clone(),
        pipeline: PhotoPipeline::from_config(config, http),
    });

    info!("Bot started, polling for updates");
    tokio::select! {
        () = poll_updates(client, ctx) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            info!("Shutting down");
        }
    }
    Ok(())
}

async fn poll_updates(client: TelegramClient, ctx: Arc<BotContext>) {
    let mut offset = 0;
    loop {
        match client.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    handlers::dispatch(Arc::clone(&ctx), update).await;
                }
            }
            Err(e) => {
                warn!(error = %e, "Polling for updates failed");
                tokio::time::sleep(POLL_ERROR_PAUSE).await;
            }
        }
    }
}
