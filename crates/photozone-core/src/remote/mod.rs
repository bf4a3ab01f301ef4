//! Network collaborators of the pipeline: the face restoration model and
//! plain URL downloads.

pub mod fetch;
pub mod replicate;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

pub use fetch::{HttpFetcher, UrlFetcher};
pub use replicate::ReplicateClient;

/// Remote AI face restoration.
///
/// Implementations send the image at `path` to the model and return a URL
/// pointing at the restored image. Every failure (transport, quota, bad
/// response) is returned as an `Err`; nothing panics.
#[async_trait]
pub trait FaceRestorer: Send + Sync {
    async fn restore_face(&self, path: &Path) -> Result<String>;
}
