//! Integration tests for the retrieval service.
//!
//! Datasets are written to temporary directories and the embedding model is
//! played by a loopback TCP listener serving canned HTTP responses, so no
//! real model service is needed.

use std::path::Path;
use std::time::Duration;

use evoke_core::MoodSliders;
use evoke_service::{
    AudioUpload, CatalogHealth, Config, ModelHealth, RefineRequest, RetrievalService, ServiceError,
    TOP_K,
};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

const ANALYSIS_BODY: &str = r#"{"embedding":[1.0,0.0],"mood_energy":0.7,"mood_valence":0.2,"mood_tempo":0.9,"mood_texture":0.4}"#;

fn write_dataset(dir: &Path) {
    std::fs::write(
        dir.join("images.json"),
        r#"[
            {"url":"https://img/east.jpg","embedding":[1.0,0.0]},
            {"url":"https://img/north.jpg","embedding":[0.0,1.0]},
            {"url":"https://img/northeast.jpg","embedding":[1.0,1.0]}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("directions.json"),
        r#"{"energy":[-1.0,1.0],"valence":[0.5,0.5],"tempo":[0.0,1.0],"texture":[1.0,0.0]}"#,
    )
    .unwrap();
}

fn config(data_dir: &Path, ml_service_url: &str) -> Config {
    Config {
        data_dir: data_dir.to_path_buf(),
        ml_service_url: ml_service_url.to_string(),
        ml_timeout_secs: 1,
        health_timeout_secs: 1,
        ..Config::default()
    }
}

/// Serve a single HTTP response and hand back the raw request text.
async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    serve_raw(response).await
}

/// Write `response` verbatim to the first connection, then close it.
async fn serve_raw(response: String) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        tx.send(request).ok();
    });

    (format!("http://{}", addr), rx)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if request_complete(&buf) {
            break;
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn request_complete(buf: &[u8]) -> bool {
    let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let body_len = buf.len() - (header_end + 4);

    if let Some(line) = headers.lines().find(|l| l.starts_with("content-length:")) {
        let expected: usize = line["content-length:".len()..].trim().parse().unwrap_or(0);
        return body_len >= expected;
    }
    if headers.contains("transfer-encoding: chunked") {
        return buf.ends_with(b"0\r\n\r\n");
    }
    true
}

/// A loopback address with nothing listening on it.
async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_analyze_forwards_audio_and_ranks_catalog() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let (url, request_rx) = serve_once("200 OK", ANALYSIS_BODY).await;

    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();
    let upload = AudioUpload::new("clip.mp3", vec![0x49, 0x44, 0x33, 0x04]);

    let response = service.analyze(&upload).await.unwrap();

    let ids: Vec<usize> = response.images.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![0, 2, 1]);
    assert_eq!(response.images[0].url, "https://img/east.jpg");
    assert!((response.mood.tempo - 0.9).abs() < f64::EPSILON);

    let request = request_rx.await.unwrap();
    assert!(request.starts_with("POST /analyze"), "{}", request);
    assert!(request.contains("name=\"audio\""));
    assert!(request.contains("filename=\"clip.mp3\""));
}

#[tokio::test]
async fn test_model_failure_status_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let (url, _request_rx) = serve_once("500 Internal Server Error", r#"{"detail":"boom"}"#).await;

    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();
    let err = service
        .analyze(&AudioUpload::new("clip.wav", vec![1, 2, 3]))
        .await
        .unwrap_err();

    match err {
        ServiceError::Upstream { status, message } => {
            assert_eq!(status, Some(500));
            assert!(message.contains("boom"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_truncated_error_body_is_still_reported() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    // Promises more body than it sends before closing.
    let response = "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 64\r\nConnection: close\r\n\r\n{\"detail\":".to_string();
    let (url, _request_rx) = serve_raw(response).await;

    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();
    let err = service
        .analyze(&AudioUpload::new("clip.flac", vec![1, 2]))
        .await
        .unwrap_err();

    match err {
        ServiceError::Upstream { status, message } => {
            assert_eq!(status, Some(503));
            assert!(message.starts_with("<unreadable body"), "{}", message);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_malformed_model_response_is_upstream_error() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let (url, _request_rx) = serve_once("200 OK", r#"{"embedding":"nope"}"#).await;

    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();
    let err = service
        .analyze(&AudioUpload::new("clip.ogg", vec![1]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Upstream { status: None, .. }));
}

#[tokio::test]
async fn test_unreachable_model_is_not_retried() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let url = closed_url().await;

    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();
    let err = service
        .analyze(&AudioUpload::new("clip.flac", vec![1]))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn test_slow_model_times_out() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let _request = read_request(&mut socket).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
    });

    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();
    let err = service
        .analyze(&AudioUpload::new("clip.mp3", vec![1]))
        .await
        .unwrap_err();

    assert!(err.is_upstream());
    assert!(matches!(err, ServiceError::UpstreamUnavailable { .. }));
}

#[tokio::test]
async fn test_health_ok() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let (url, request_rx) = serve_once("200 OK", r#"{"healthy":true}"#).await;

    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();
    let report = service.health().await;

    assert!(report.is_ok());
    assert_eq!(report.services.vectorstore, CatalogHealth::Ok { images: 3 });
    assert_eq!(report.services.ml, ModelHealth::Ok);
    assert!(request_rx.await.unwrap().starts_with("GET /health"));
}

#[tokio::test]
async fn test_health_reports_model_error_status() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let (url, _request_rx) = serve_once("503 Service Unavailable", "{}").await;

    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();
    let report = service.health().await;

    assert_eq!(report.services.ml, ModelHealth::Error);
    assert!(report.is_ok());
}

#[tokio::test]
async fn test_missing_dataset_keeps_service_up() {
    let temp_dir = TempDir::new().unwrap();
    let url = closed_url().await;

    let service =
        RetrievalService::from_config(&config(&temp_dir.path().join("missing"), &url)).unwrap();

    assert!(service.dataset().is_none());
    assert!(service.search(&[1.0, 0.0], 5).is_empty());

    let report = service.health().await;
    assert!(!report.is_ok());
    assert_eq!(report.services.vectorstore, CatalogHealth::NotLoaded);
    assert_eq!(report.services.ml, ModelHealth::Unreachable);

    let json = serde_json::to_value(report).unwrap();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["services"]["vectorstore"], "error: not loaded");
}

#[tokio::test]
async fn test_empty_catalog_is_distinguished_from_missing() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    std::fs::write(temp_dir.path().join("images.json"), "[]").unwrap();
    let url = closed_url().await;

    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();

    assert!(service.search(&[1.0, 0.0], 5).is_empty());
    assert_eq!(service.health().await.services.vectorstore, CatalogHealth::Empty);
}

#[tokio::test]
async fn test_concurrent_refines_agree() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let url = closed_url().await;
    let service = RetrievalService::from_config(&config(temp_dir.path(), &url)).unwrap();

    let sliders = MoodSliders::new(0.9, 0.3, 0.6, 0.1);
    let expected = service
        .refine(RefineRequest::new(vec![0.6, 0.8], sliders))
        .unwrap();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                // Interleave other slider positions to overlap with the checked ones.
                let sliders = if i % 2 == 0 {
                    sliders
                } else {
                    MoodSliders::new(0.1, 0.9, 0.2, 0.8)
                };
                (i, service.refine(RefineRequest::new(vec![0.6, 0.8], sliders)).unwrap())
            })
        })
        .collect();

    for handle in handles {
        let (i, response) = handle.await.unwrap();
        if i % 2 == 0 {
            assert_eq!(response, expected);
        }
        assert!(response.images.len() <= TOP_K);
    }
}

#[tokio::test]
async fn test_demo_fixture_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let url = closed_url().await;
    let cfg = config(temp_dir.path(), &url);

    let service = RetrievalService::from_config(&cfg).unwrap();
    assert!(matches!(service.demo(), Err(ServiceError::DemoUnavailable)));

    let fixture = service.build_demo(None).await.unwrap();
    fixture
        .write_to(&temp_dir.path().join(evoke_core::dataset::DEMO_FILE))
        .unwrap();

    let reloaded = RetrievalService::from_config(&cfg).unwrap();
    let demo = reloaded.demo().unwrap();
    assert_eq!(demo.sliders(), MoodSliders::NEUTRAL);
    assert_eq!(demo.embedding.dim(), fixture.embedding.dim());
    for (a, b) in demo.embedding.iter().zip(fixture.embedding.iter()) {
        assert!((a - b).abs() < 1e-12);
    }
    let ids: Vec<usize> = demo.images.iter().map(|r| r.id).collect();
    let expected: Vec<usize> = fixture.images.iter().map(|r| r.id).collect();
    assert_eq!(ids, expected);
    assert_eq!(ids.len(), 3);
}

#[tokio::test]
async fn test_corrupt_demo_does_not_block_catalog_or_rebuild() {
    let temp_dir = TempDir::new().unwrap();
    write_dataset(temp_dir.path());
    let demo_path = temp_dir.path().join(evoke_core::dataset::DEMO_FILE);
    std::fs::write(&demo_path, "{").unwrap();
    let cfg = config(temp_dir.path(), &closed_url().await);

    let service = RetrievalService::from_config(&cfg).unwrap();
    assert_eq!(service.catalog_health(), CatalogHealth::Ok { images: 3 });
    assert_eq!(service.search(&[1.0, 0.0], 2).len(), 2);
    assert!(matches!(service.demo(), Err(ServiceError::DemoUnavailable)));

    service.build_demo(None).await.unwrap().write_to(&demo_path).unwrap();

    let reloaded = RetrievalService::from_config(&cfg).unwrap();
    assert!(reloaded.demo().is_ok());
}
