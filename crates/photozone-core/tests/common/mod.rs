use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use photozone_core::error::{PhotozoneError, Result};
use photozone_core::io::image_io::encode_jpeg;
use photozone_core::pipeline::{PhotoSource, ProgressSink};
use photozone_core::remote::{FaceRestorer, UrlFetcher};

/// Build a synthetic RGB image with horizontal and vertical gradients and a
/// bright square in the middle, so every filter has something to change.
pub fn test_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let in_square = x > width / 3 && x < 2 * width / 3 && y > height / 3 && y < 2 * height / 3;
        if in_square {
            Rgb([230, 210, 190])
        } else {
            Rgb([
                (x * 200 / width.max(1)) as u8 + 20,
                (y * 150 / height.max(1)) as u8 + 30,
                90,
            ])
        }
    })
}

pub fn test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode_jpeg(&test_image(width, height), 90).unwrap()
}

pub fn write_test_jpeg(path: &Path) {
    std::fs::write(path, test_jpeg(32, 24)).unwrap();
}

/// In-memory `UrlFetcher`. Unknown URLs are 404s.
#[derive(Default)]
pub struct FakeFetcher {
    bodies: HashMap<String, Vec<u8>>,
    fail_from_call: Option<usize>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: Vec<u8>) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    /// Every call numbered `n` (1-based) or later fails.
    pub fn failing_from_call(mut self, n: usize) -> Self {
        self.fail_from_call = Some(n);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl UrlFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let call_no = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(url.to_string());
            calls.len()
        };
        if self.fail_from_call.is_some_and(|n| call_no >= n) {
            return Err(PhotozoneError::HttpStatus {
                status: 503,
                url: url.to_string(),
            });
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| PhotozoneError::HttpStatus {
                status: 404,
                url: url.to_string(),
            })
    }
}

/// Progress sink that remembers every update.
#[derive(Default)]
pub struct RecordingProgress {
    pub updates: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn updates(&self) -> Vec<String> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressSink for RecordingProgress {
    async fn update(&self, text: &str) -> Result<()> {
        self.updates.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Face restorer with a fixed outcome. Records the paths it was given and
/// whether the file existed at call time.
pub struct ScriptedRestorer {
    outcome: std::result::Result<String, String>,
    pub calls: Mutex<Vec<(PathBuf, bool)>>,
}

impl ScriptedRestorer {
    pub fn returning(url: &str) -> Self {
        Self {
            outcome: Ok(url.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FaceRestorer for ScriptedRestorer {
    async fn restore_face(&self, path: &Path) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_path_buf(), path.exists()));
        match &self.outcome {
            Ok(url) => Ok(url.clone()),
            Err(message) => Err(PhotozoneError::Prediction {
                id: "test".to_string(),
                status: "failed".to_string(),
                message: message.clone(),
            }),
        }
    }
}

/// Photo source serving fixed bytes for every download.
pub struct BytesSource {
    body: Option<Vec<u8>>,
}

impl BytesSource {
    pub fn new(body: Vec<u8>) -> Self {
        Self { body: Some(body) }
    }

    pub fn unreachable() -> Self {
        Self { body: None }
    }
}

#[async_trait]
impl PhotoSource for BytesSource {
    async fn download_file(&self, file_path: &str, dest: &Path) -> Result<()> {
        match &self.body {
            Some(body) => {
                tokio::fs::write(dest, body).await?;
                Ok(())
            }
            None => Err(PhotozoneError::Messaging(format!(
                "download of {file_path} failed"
            ))),
        }
    }
}

/// Names of all files directly inside `dir`, sorted.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// One request received by a `ScriptedServer`.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    /// e.g. `POST /v1/predictions HTTP/1.1`
    pub request_line: String,
    /// Header lines, lowercased.
    pub headers: Vec<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn has_header(&self, line: &str) -> bool {
        self.headers.iter().any(|h| h == &line.to_lowercase())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Minimal HTTP/1.1 server on a loopback port. Each connection gets the next
/// scripted `(status, body)` response and is then closed. `{base}` in a body
/// is replaced by the server's own base URL.
pub struct ScriptedServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedServer {
    pub async fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&requests);
        let base = base_url.clone();
        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept().await else {
                    return;
                };
                let request = read_request(&mut stream).await;
                log.lock().unwrap().push(request);
                let body = body.replace("{base}", &base);
                let response = format!(
                    "HTTP/1.1 {status} Scripted\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        Self { base_url, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> RecordedRequest {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 8192];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        raw.extend_from_slice(&chunk[..n]);
        if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        if n == 0 {
            break raw.len();
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let headers: Vec<String> = lines.map(str::to_lowercase).collect();
    let content_length = headers
        .iter()
        .find_map(|h| h.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(0);

    let body_start = (header_end + 4).min(raw.len());
    while raw.len() < body_start + content_length {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..n]);
    }

    RecordedRequest {
        request_line,
        headers,
        body: raw[body_start..].to_vec(),
    }
}
