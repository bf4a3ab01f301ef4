#[allow(dead_code)]
mod common;

use std::path::PathBuf;

use photozone_core::config::RestoreConfig;
use photozone_core::consts::INLINE_IMAGE_MAX_BYTES;
use photozone_core::error::PhotozoneError;
use photozone_core::remote::{FaceRestorer, HttpFetcher, ReplicateClient, UrlFetcher};

use common::ScriptedServer;

const TOKEN: &str = "r8_test";
const OUTPUT_URL: &str = "https://replicate.delivery/pbxt/out.png";

fn client_for(api_base: &str) -> ReplicateClient {
    let config = RestoreConfig {
        api_base: api_base.to_string(),
        model_version: "v-test".to_string(),
        poll_interval_ms: 1,
    };
    ReplicateClient::new(reqwest::Client::new(), TOKEN, config)
}

fn photo(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("9_color.jpg");
    common::write_test_jpeg(&path);
    path
}

fn ok(body: &str) -> (u16, String) {
    (200, body.to_string())
}

// ---------------------------------------------------------------------------
// ReplicateClient
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_restore_unreachable_endpoint_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = client_for("http://127.0.0.1:1");

    let err = client.restore_face(&photo(&dir)).await.unwrap_err();
    assert!(matches!(err, PhotozoneError::Http(_)), "{err}");
}

#[tokio::test]
async fn test_restore_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let client = client_for("http://127.0.0.1:1");

    let err = client
        .restore_face(&dir.path().join("absent.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, PhotozoneError::Io(_)), "{err}");
}

#[tokio::test]
async fn test_restore_server_error_status() {
    let dir = tempfile::tempdir().unwrap();
    let server = ScriptedServer::start(vec![(500, r#"{"detail":"boom"}"#.to_string())]).await;

    let err = client_for(&server.base_url)
        .restore_face(&photo(&dir))
        .await
        .unwrap_err();
    match err {
        PhotozoneError::HttpStatus { status, url } => {
            assert_eq!(status, 500);
            assert_eq!(url, server.url("/v1/predictions"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_restore_failed_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let server = ScriptedServer::start(vec![ok(
        r#"{"id":"p-fail","status":"failed","error":"CUDA out of memory"}"#,
    )])
    .await;

    let err = client_for(&server.base_url)
        .restore_face(&photo(&dir))
        .await
        .unwrap_err();
    match err {
        PhotozoneError::Prediction {
            id,
            status,
            message,
        } => {
            assert_eq!(id, "p-fail");
            assert_eq!(status, "failed");
            assert_eq!(message, "CUDA out of memory");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_restore_canceled_while_polling() {
    let dir = tempfile::tempdir().unwrap();
    let server = ScriptedServer::start(vec![
        ok(r#"{"id":"p-c","status":"starting"}"#),
        ok(r#"{"id":"p-c","status":"canceled"}"#),
    ])
    .await;

    let err = client_for(&server.base_url)
        .restore_face(&photo(&dir))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("canceled"), "{err}");

    // Without `urls.get` the status is read from `/v1/predictions/{id}`.
    let requests = server.requests();
    assert_eq!(requests[1].request_line, "GET /v1/predictions/p-c HTTP/1.1");
}

#[tokio::test]
async fn test_restore_polls_until_succeeded() {
    let dir = tempfile::tempdir().unwrap();
    let server = ScriptedServer::start(vec![
        ok(r#"{"id":"p1","status":"starting","urls":{"get":"{base}/v1/predictions/p1"}}"#),
        ok(r#"{"id":"p1","status":"processing","urls":{"get":"{base}/v1/predictions/p1"}}"#),
        ok(&format!(
            r#"{{"id":"p1","status":"succeeded","output":"{OUTPUT_URL}"}}"#
        )),
    ])
    .await;

    let url = client_for(&server.base_url)
        .restore_face(&photo(&dir))
        .await
        .unwrap();
    assert_eq!(url, OUTPUT_URL);

    let requests = server.requests();
    let lines: Vec<&str> = requests.iter().map(|r| r.request_line.as_str()).collect();
    assert_eq!(
        lines,
        vec![
            "POST /v1/predictions HTTP/1.1",
            "GET /v1/predictions/p1 HTTP/1.1",
            "GET /v1/predictions/p1 HTTP/1.1",
        ]
    );
    for request in &requests {
        assert!(request.has_header(&format!("authorization: Bearer {TOKEN}")));
    }
}

#[tokio::test]
async fn test_create_sends_fixed_model_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let server = ScriptedServer::start(vec![ok(&format!(
        r#"{{"id":"p2","status":"succeeded","output":["{OUTPUT_URL}"]}}"#
    ))])
    .await;

    let url = client_for(&server.base_url)
        .restore_face(&photo(&dir))
        .await
        .unwrap();
    assert_eq!(url, OUTPUT_URL);

    let create = &server.requests()[0];
    assert!(create.has_header("prefer: wait"));
    let body = create.json();
    assert_eq!(body["version"], "v-test");
    let input = &body["input"];
    assert!(input["image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
    assert!((input["codeformer_fidelity"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert_eq!(input["background_enhance"], false);
    assert_eq!(input["upscale"], 1);
}

#[tokio::test]
async fn test_succeeded_without_output_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let server =
        ScriptedServer::start(vec![ok(r#"{"id":"p3","status":"succeeded","output":null}"#)]).await;

    let err = client_for(&server.base_url)
        .restore_face(&photo(&dir))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("no output URL"), "{err}");
}

#[tokio::test]
async fn test_malformed_prediction_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let server = ScriptedServer::start(vec![ok("<html>gateway</html>")]).await;

    let result = client_for(&server.base_url).restore_face(&photo(&dir)).await;
    assert!(matches!(result, Err(PhotozoneError::Http(_))));
}

#[tokio::test]
async fn test_large_image_goes_through_files_api() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("9_color.jpg");
    std::fs::write(&path, vec![0xAB; INLINE_IMAGE_MAX_BYTES + 1]).unwrap();

    let server = ScriptedServer::start(vec![
        ok(r#"{"id":"f1","urls":{"get":"{base}/v1/files/f1"}}"#),
        ok(&format!(
            r#"{{"id":"p4","status":"succeeded","output":"{OUTPUT_URL}"}}"#
        )),
    ])
    .await;

    let url = client_for(&server.base_url).restore_face(&path).await.unwrap();
    assert_eq!(url, OUTPUT_URL);

    let requests = server.requests();
    assert_eq!(requests[0].request_line, "POST /v1/files HTTP/1.1");
    assert!(requests[0].body.len() > INLINE_IMAGE_MAX_BYTES);
    assert_eq!(requests[1].request_line, "POST /v1/predictions HTTP/1.1");
    assert_eq!(requests[1].json()["input"]["image"], server.url("/v1/files/f1"));
}

#[tokio::test]
async fn test_failed_upload_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("9_color.jpg");
    std::fs::write(&path, vec![0xAB; INLINE_IMAGE_MAX_BYTES + 1]).unwrap();
    let server = ScriptedServer::start(vec![(413, r#"{"detail":"too large"}"#.to_string())]).await;

    let err = client_for(&server.base_url)
        .restore_face(&path)
        .await
        .unwrap_err();
    assert!(matches!(err, PhotozoneError::HttpStatus { status: 413, .. }));
    assert_eq!(server.requests().len(), 1);
}

// ---------------------------------------------------------------------------
// HttpFetcher
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fetch_returns_body() {
    let server = ScriptedServer::start(vec![ok("restored-bytes")]).await;
    let fetcher = HttpFetcher::new(reqwest::Client::new());

    let body = fetcher.fetch(&server.url("/out.png")).await.unwrap();
    assert_eq!(body, b"restored-bytes");
    assert_eq!(server.requests()[0].request_line, "GET /out.png HTTP/1.1");
}

#[tokio::test]
async fn test_fetch_non_success_status_is_error() {
    let server = ScriptedServer::start(vec![(404, "{}".to_string())]).await;
    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let url = server.url("/gone.png");

    let err = fetcher.fetch(&url).await.unwrap_err();
    match err {
        PhotozoneError::HttpStatus { status, url: failed } => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_unreachable_host_is_error() {
    let fetcher = HttpFetcher::default();
    let result = fetcher.fetch("http://127.0.0.1:1/out.png").await;
    assert!(matches!(result, Err(PhotozoneError::Http(_))));
}
