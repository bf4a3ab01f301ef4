//! Minimal Telegram Bot API client over `reqwest`.

use std::path::Path;

use async_trait::async_trait;
use photozone_core::error::{PhotozoneError, Result};
use photozone_core::pipeline::{FileInfo, PhotoSource};
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Vec<PhotoSize>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize)]
struct TelegramFile {
    file_id: String,
    file_path: Option<String>,
}

impl Message {
    /// The user the photo belongs to, falling back to the chat id.
    pub fn user_id(&self) -> i64 {
        self.from.as_ref().map_or(self.chat.id, |u| u.id)
    }

    pub fn is_command(&self, command: &str) -> bool {
        self.text
            .as_deref()
            .and_then(|t| t.split_whitespace().next())
            .map(|first| first.split('@').next() == Some(command))
            .unwrap_or(false)
    }

    /// The highest-resolution size of an attached photo.
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo
            .iter()
            .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
    }
}

#[derive(Clone, Debug)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(http: reqwest::Client, api_base: &str, token: impl Into<String>) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/file/bot{}/{}", self.api_base, self.token, file_path)
    }

    async fn decode<T: DeserializeOwned>(method: &str, response: reqwest::Response) -> Result<T> {
        // Drop the URL from transport errors: it carries the bot token.
        let body: ApiResponse<T> = response.json().await.map_err(|e| e.without_url())?;
        match body.result {
            Some(result) if body.ok => Ok(result),
            _ => Err(PhotozoneError::Messaging(format!(
                "{method}: {}",
                body.description.unwrap_or_else(|| "request rejected".to_string())
            ))),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let response = self
            .http
            .post(self.method_url(method))
            .json(&params)
            .send()
            .await
            .map_err(|e| e.without_url())?;
        Self::decode(method, response).await
    }

    /// Long-poll for new updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            json!({ "offset": offset, "timeout": timeout_secs, "allowed_updates": ["message"] }),
        )
        .await
    }

    pub async fn get_file(&self, file_id: &str) -> Result<FileInfo> {
        let file: TelegramFile = self.call("getFile", json!({ "file_id": file_id })).await?;
        let file_path = file.file_path.ok_or_else(|| {
            PhotozoneError::Messaging(format!("file {} has no download path", file.file_id))
        })?;
        Ok(FileInfo {
            file_id: file.file_id,
            file_path,
        })
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<Message> {
        self.call("sendMessage", json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    pub async fn edit_message_text(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        let _: Value = self
            .call(
                "editMessageText",
                json!({ "chat_id": chat_id, "message_id": message_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        let _: bool = self
            .call(
                "deleteMessage",
                json!({ "chat_id": chat_id, "message_id": message_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn send_photo(&self, chat_id: i64, path: &Path, caption: &str) -> Result<Message> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo.jpg".to_string());
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", part);

        let response = self
            .http
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| e.without_url())?;
        Self::decode("sendPhoto", response).await
    }
}

#[async_trait]
impl PhotoSource for TelegramClient {
    async fn download_file(&self, file_path: &str, dest: &Path) -> Result<()> {
        let response = self
            .http
            .get(self.file_url(file_path))
            .send()
            .await
            .map_err(|e| e.without_url())?;
        let status = response.status();
        if !status.is_success() {
            return Err(PhotozoneError::HttpStatus {
                status: status.as_u16(),
                url: file_path.to_string(),
            });
        }
        let bytes = response.bytes().await.map_err(|e| e.without_url())?;
        tokio::fs::write(dest, &bytes).await?;
        debug!(file_path, dest = %dest.display(), size = bytes.len(), "Downloaded photo");
        Ok(())
    }
}
