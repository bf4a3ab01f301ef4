use async_trait::async_trait;
use indicatif::ProgressBar;
use photozone_core::error::Result;
use photozone_core::pipeline::ProgressSink;

use crate::telegram::TelegramClient;

/// Progress shown by editing one chat message in place.
pub struct MessageProgress {
    client: TelegramClient,
    chat_id: i64,
    message_id: i64,
}

impl MessageProgress {
    pub fn new(client: TelegramClient, chat_id: i64, message_id: i64) -> Self {
        Self {
            client,
            chat_id,
            message_id,
        }
    }
}

#[async_trait]
impl ProgressSink for MessageProgress {
    async fn update(&self, text: &str) -> Result<()> {
        self.client
            .edit_message_text(self.chat_id, self.message_id, text)
            .await
    }
}

/// Terminal progress bar for the local `process` command.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

#[async_trait]
impl ProgressSink for BarProgress {
    async fn update(&self, text: &str) -> Result<()> {
        self.bar.inc(1);
        self.bar.set_message(text.to_string());
        Ok(())
    }
}
