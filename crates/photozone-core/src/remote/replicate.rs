use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::RestoreConfig;
use crate::consts::{
    INLINE_IMAGE_MAX_BYTES, RESTORE_BACKGROUND_ENHANCE, RESTORE_FIDELITY, RESTORE_UPSCALE,
};
use crate::error::{PhotozoneError, Result};

use super::FaceRestorer;

/// Input document of a CodeFormer prediction.
#[derive(Debug, Serialize)]
struct CodeFormerInput {
    image: String,
    codeformer_fidelity: f32,
    background_enhance: bool,
    upscale: u32,
}

impl CodeFormerInput {
    /// The model parameters are the same for every call.
    fn new(image: String) -> Self {
        Self {
            image,
            codeformer_fidelity: RESTORE_FIDELITY,
            background_enhance: RESTORE_BACKGROUND_ENHANCE,
            upscale: RESTORE_UPSCALE,
        }
    }
}

#[derive(Debug, Serialize)]
struct CreatePrediction<'a> {
    version: &'a str,
    input: CodeFormerInput,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    get: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    id: String,
    urls: FileUrls,
}

#[derive(Debug, Deserialize)]
struct FileUrls {
    get: String,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    id: String,
    status: PredictionStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

impl Prediction {
    fn failure(&self, message: impl Into<String>) -> PhotozoneError {
        PhotozoneError::Prediction {
            id: self.id.clone(),
            status: format!("{:?}", self.status).to_lowercase(),
            message: message.into(),
        }
    }

    /// The output URL: either a bare string or the first string of an array.
    fn output_url(&self) -> Option<String> {
        match self.output.as_ref()? {
            Value::String(url) => Some(url.clone()),
            Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_string)),
            _ => None,
        }
    }
}

/// Face restoration through the Replicate predictions API.
///
/// One prediction per call, no retries. The HTTP client's own defaults are
/// the only timeout.
///
/// Replicate accepts `data:` URIs only for small inputs. Images up to
/// [`INLINE_IMAGE_MAX_BYTES`] are sent inline; larger ones are uploaded to
/// `/v1/files` first and the prediction references the returned file URL.
#[derive(Clone, Debug)]
pub struct ReplicateClient {
    http: reqwest::Client,
    token: String,
    config: RestoreConfig,
}

impl ReplicateClient {
    pub fn new(http: reqwest::Client, token: impl Into<String>, config: RestoreConfig) -> Self {
        Self {
            http,
            token: token.into(),
            config,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v1/{path}", self.config.api_base.trim_end_matches('/'))
    }

    fn predictions_url(&self) -> String {
        self.api_url("predictions")
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PhotozoneError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.json::<T>().await?)
    }

    /// The value of the `image` input: inline for small files, otherwise a
    /// Files API URL.
    async fn image_input(&self, image_bytes: Vec<u8>) -> Result<String> {
        if image_bytes.len() <= INLINE_IMAGE_MAX_BYTES {
            return Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&image_bytes)));
        }
        self.upload(image_bytes).await
    }

    async fn upload(&self, image_bytes: Vec<u8>) -> Result<String> {
        let size = image_bytes.len();
        let part = multipart::Part::bytes(image_bytes)
            .file_name("photo.jpg")
            .mime_str("image/jpeg")?;
        let form = multipart::Form::new().part("content", part);
        let url = self.api_url("files");
        let file: UploadedFile = self.send(self.http.post(&url).multipart(form), &url).await?;
        debug!(id = %file.id, size, "Uploaded image to Replicate");
        Ok(file.urls.get)
    }

    async fn create(&self, image_bytes: Vec<u8>) -> Result<Prediction> {
        let body = CreatePrediction {
            version: &self.config.model_version,
            input: CodeFormerInput::new(self.image_input(image_bytes).await?),
        };
        let url = self.predictions_url();
        let request = self.http.post(&url).header("Prefer", "wait").json(&body);
        self.send(request, &url).await
    }

    async fn poll(&self, prediction: &Prediction) -> Result<Prediction> {
        let url = prediction
            .urls
            .as_ref()
            .and_then(|u| u.get.clone())
            .unwrap_or_else(|| format!("{}/{}", self.predictions_url(), prediction.id));
        tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
        self.send(self.http.get(&url), &url).await
    }
}

#[async_trait]
impl FaceRestorer for ReplicateClient {
    async fn restore_face(&self, path: &Path) -> Result<String> {
        let image_bytes = tokio::fs::read(path).await?;
        let mut prediction = self.create(image_bytes).await?;
        info!(id = %prediction.id, path = %path.display(), "CodeFormer prediction created");

        loop {
            match prediction.status {
                PredictionStatus::Succeeded => {
                    return prediction
                        .output_url()
                        .ok_or_else(|| prediction.failure("prediction returned no output URL"));
                }
                PredictionStatus::Failed | PredictionStatus::Canceled => {
                    let message = prediction
                        .error
                        .as_ref()
                        .map(|e| e.as_str().map_or_else(|| e.to_string(), str::to_string))
                        .unwrap_or_else(|| "no error message".to_string());
                    return Err(prediction.failure(message));
                }
                PredictionStatus::Starting | PredictionStatus::Processing => {
                    debug!(id = %prediction.id, status = ?prediction.status, "Waiting for prediction");
                    prediction = self.poll(&prediction).await?;
                }
            }
        }
    }
}
