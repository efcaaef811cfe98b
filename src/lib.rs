//! Streamhls - upload a video, get an HLS stream back.
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (stream names, HLS layout and playlists)
//! - ports/: Trait definitions (registry, transcoder)
//! - adapters/: Concrete implementations (ffmpeg, JSON file registry, filesystem, HTTP)
//! - application/: Upload-to-stream pipeline
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use adapters::ffmpeg::FfmpegTranscoder;
pub use adapters::fs::MediaStore;
pub use adapters::http::router;
pub use adapters::json_registry::JsonFileRegistry;
pub use application::publisher::PublishService;
pub use config::{ServerConfig, UploadResponse};
pub use error::AppError;
