use crate::domain::hls::HlsLayout;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    /// The process could not be launched at all.
    #[error("failed to start {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("lost track of transcoder process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("transcoder exited with {status}: {stderr_tail}")]
    Failed {
        status: ExitStatus,
        stderr_tail: String,
    },

    /// Exited cleanly but left no readable playlist behind.
    #[error("transcoder produced no playlist at {path:?}: {source}")]
    MissingOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Turns a source video into an HLS rendition laid out as `layout` describes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, source: &Path, layout: &HlsLayout) -> Result<(), TranscodeError>;
}
