//! Filesystem areas: raw uploads and generated streams.

use crate::domain::hls::HlsLayout;
use crate::domain::stream::StreamName;
use axum::body::Bytes;
use axum::BoxError;
use futures::{Stream, TryStreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;

/// Outcome of wiping the streams area.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub removed: usize,
    pub failed: usize,
}

#[derive(Clone, Debug)]
pub struct MediaStore {
    uploads_dir: PathBuf,
    streams_dir: PathBuf,
}

impl MediaStore {
    pub fn new(uploads_dir: PathBuf, streams_dir: PathBuf) -> Self {
        Self {
            uploads_dir,
            streams_dir,
        }
    }

    pub fn streams_dir(&self) -> &Path {
        &self.streams_dir
    }

    /// Create both areas if they are missing.
    pub async fn prepare(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        tokio::fs::create_dir_all(&self.streams_dir).await
    }

    /// Where an upload named `file_name` is stored. The name must already be sanitized.
    pub fn upload_path(&self, file_name: &str) -> PathBuf {
        self.uploads_dir.join(file_name)
    }

    /// Write a body stream to the uploads area, replacing any file of the same name.
    pub async fn save_upload<S, E>(&self, file_name: &str, stream: S) -> io::Result<PathBuf>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Into<BoxError>,
    {
        let path = self.upload_path(file_name);
        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        stream_to_file(&path, stream).await?;
        Ok(path)
    }

    /// Make sure the output directory for `name` exists and return its layout.
    pub async fn ensure_stream_dir(&self, name: &StreamName) -> io::Result<HlsLayout> {
        let layout = HlsLayout::new(&self.streams_dir, name.clone());
        tokio::fs::create_dir_all(&layout.dir).await?;
        Ok(layout)
    }

    /// Remove every top-level entry of the streams area.
    ///
    /// Only failing to list the area is an error; entries that cannot be
    /// removed are logged and counted.
    pub async fn clear_streams(&self) -> io::Result<CleanupReport> {
        let mut entries = tokio::fs::read_dir(&self.streams_dir).await?;
        let mut report = CleanupReport::default();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let removed = match entry.file_type().await {
                Ok(kind) if kind.is_dir() => tokio::fs::remove_dir_all(&path).await,
                Ok(_) => tokio::fs::remove_file(&path).await,
                Err(e) => Err(e),
            };
            match removed {
                Ok(()) => report.removed += 1,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to delete stream entry");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

// Save a `Stream` to a file
async fn stream_to_file<S, E>(path: &Path, stream: S) -> io::Result<()>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    tokio::io::copy(&mut body_reader, &mut file).await?;
    file.flush().await?;

    Ok(())
}
