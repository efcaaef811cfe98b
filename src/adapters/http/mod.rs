//! HTTP inbound adapter.
//!
//! Routes:
//! - `GET /` upload form
//! - `GET /streamhls/:streamname` playback page
//! - `GET /allstreams` listing page
//! - `GET /streams/*` generated playlists and segments
//! - `POST /upload` multipart video upload
//! - `GET /api/streams` registry as JSON
//! - `GET /clean` wipe generated streams

mod api;
mod assets;
mod upload;

pub use assets::hls_media_type;

use crate::application::publisher::PublishService;
use crate::config::{ServerConfig, UploadResponse};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, get_service, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<PublishService>,
    /// Multipart field carrying the video
    pub upload_field: Arc<str>,
    pub upload_response: UploadResponse,
}

/// Build the full router for `publisher`, serving pages from the configured views directory.
pub fn router(config: &ServerConfig, publisher: Arc<PublishService>) -> Router {
    let views = &config.views_dir;

    let assets = Router::new()
        .nest_service("/streams", ServeDir::new(publisher.store().streams_dir()))
        .layer(middleware::from_fn(assets::hls_content_type));

    let state = AppState {
        publisher,
        upload_field: Arc::from(config.upload_field.as_str()),
        upload_response: config.upload_response,
    };

    Router::new()
        .route("/", get_service(ServeFile::new(views.join("upload.html"))))
        .route(
            "/streamhls/:streamname",
            get_service(ServeFile::new(views.join("index.html"))),
        )
        .route(
            "/allstreams",
            get_service(ServeFile::new(views.join("allstreams.html"))),
        )
        .route("/upload", post(upload::upload_media))
        .route("/api/streams", get(api::list_streams))
        .route("/clean", get(api::clean))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
        .merge(assets)
        .layer(TraceLayer::new_for_http())
}
