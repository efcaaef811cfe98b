//! Shared test harness for integration tests.
//!
//! [`TestHarness`] lays out uploads, streams, views and the registry in a
//! temporary directory and builds the full router over them.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use streamhls::domain::hls::{HlsLayout, MediaPlaylist};
use streamhls::ports::registry::StreamRegistry;
use streamhls::ports::transcoder::{TranscodeError, Transcoder};
use streamhls::{router, JsonFileRegistry, MediaStore, PublishService, ServerConfig, UploadResponse};
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "streamhls-test-boundary";

/// Writes a two segment rendition instead of running ffmpeg.
pub struct FakeTranscoder {
    pub delay: Duration,
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, source: &Path, layout: &HlsLayout) -> Result<(), TranscodeError> {
        assert!(source.exists(), "upload should be saved before transcoding");
        tokio::time::sleep(self.delay).await;

        let mut playlist = MediaPlaylist::new(3);
        for index in 0..2 {
            let segment = layout.segment_file_name(index);
            tokio::fs::write(layout.dir.join(&segment), b"\x47fake transport stream")
                .await
                .unwrap();
            playlist.add_segment(3.0, segment);
        }
        playlist.write_to(&layout.playlist_path()).await.unwrap();
        Ok(())
    }
}

pub struct TestHarness {
    pub dir: TempDir,
    pub config: ServerConfig,
    pub registry: Arc<JsonFileRegistry>,
    pub app: Router,
}

impl TestHarness {
    /// Harness answering uploads with JSON, backed by [`FakeTranscoder`].
    pub async fn new() -> Self {
        Self::with(
            Arc::new(FakeTranscoder {
                delay: Duration::ZERO,
            }),
            UploadResponse::Json,
        )
        .await
    }

    pub async fn with(transcoder: Arc<dyn Transcoder>, upload_response: UploadResponse) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let mut config = ServerConfig::rooted_at(dir.path());
        config.upload_response = upload_response;

        std::fs::create_dir_all(&config.views_dir).unwrap();
        for page in ["upload.html", "index.html", "allstreams.html"] {
            std::fs::write(config.views_dir.join(page), format!("<html>{}</html>", page)).unwrap();
        }

        let store = MediaStore::new(config.uploads_dir.clone(), config.streams_dir.clone());
        store.prepare().await.unwrap();

        let registry = Arc::new(JsonFileRegistry::new(config.registry_path.clone()));
        registry.init().await.unwrap();

        let publisher = Arc::new(PublishService::new(
            store,
            registry.clone(),
            transcoder,
            config.public_base_url.clone(),
        ));
        let app = router(&config, publisher);

        Self {
            dir,
            config,
            registry,
            app,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn upload(&self, field: &str, file_name: &str, content: &[u8]) -> Response<Body> {
        self.send(multipart_request(&[(field, Some(file_name), content)]))
            .await
    }

    pub fn entries(&self, dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Build a `POST /upload` request from `(field, file name, content)` parts.
pub fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (field, file_name, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                     Content-Type: video/mp4\r\n\r\n",
                    field, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", field).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::post("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn body_string(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}
