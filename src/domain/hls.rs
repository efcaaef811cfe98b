//! HLS output layout and playlist handling.

use super::stream::StreamName;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Target segment duration passed to the transcoder, in seconds.
pub const SEGMENT_DURATION_SECS: u32 = 3;

/// Where the playlist and segments of one stream live.
///
/// `streams/demo` holds `demo.m3u8` and `demo_000.ts`, `demo_001.ts`, ...
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HlsLayout {
    pub dir: PathBuf,
    pub name: StreamName,
}

impl HlsLayout {
    pub fn new(streams_root: &Path, name: StreamName) -> Self {
        Self {
            dir: streams_root.join(name.as_str()),
            name,
        }
    }

    pub fn playlist_file_name(&self) -> String {
        format!("{}.m3u8", self.name)
    }

    pub fn playlist_path(&self) -> PathBuf {
        self.dir.join(self.playlist_file_name())
    }

    pub fn segment_file_name(&self, index: usize) -> String {
        format!("{}_{:03}.ts", self.name, index)
    }

    /// printf-style pattern handed to ffmpeg's `-hls_segment_filename`.
    pub fn segment_pattern(&self) -> PathBuf {
        self.dir.join(format!("{}_%03d.ts", self.name))
    }
}

pub struct MediaSegment {
    pub duration: f64,
    pub uri: String,
}

pub struct MediaPlaylist {
    pub version: u8,
    pub target_duration: u64,
    pub media_sequence: u64,
    pub segments: Vec<MediaSegment>,
    pub end_list: bool,
}

impl MediaPlaylist {
    pub fn new(target_duration: u64) -> Self {
        Self {
            version: 3,
            target_duration,
            media_sequence: 0,
            segments: Vec::new(),
            end_list: true,
        }
    }

    pub fn add_segment(&mut self, duration: f64, uri: String) {
        self.segments.push(MediaSegment { duration, uri });
    }

    /// Parse the subset of a media playlist the transcoder emits.
    pub fn parse(content: &str) -> Option<Self> {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
        if lines.next() != Some("#EXTM3U") {
            return None;
        }

        let mut playlist = MediaPlaylist::new(0);
        playlist.end_list = false;
        let mut pending: Option<f64> = None;

        for line in lines {
            if let Some(v) = line.strip_prefix("#EXT-X-VERSION:") {
                playlist.version = v.parse().ok()?;
            } else if let Some(v) = line.strip_prefix("#EXT-X-TARGETDURATION:") {
                playlist.target_duration = v.parse().ok()?;
            } else if let Some(v) = line.strip_prefix("#EXT-X-MEDIA-SEQUENCE:") {
                playlist.media_sequence = v.parse().ok()?;
            } else if let Some(v) = line.strip_prefix("#EXTINF:") {
                let duration = v.split(',').next().unwrap_or(v);
                pending = Some(duration.parse().ok()?);
            } else if line == "#EXT-X-ENDLIST" {
                playlist.end_list = true;
            } else if line.starts_with('#') {
                continue;
            } else if let Some(duration) = pending.take() {
                playlist.add_segment(duration, line.to_owned());
            }
        }

        Some(playlist)
    }

    pub async fn read_from(path: &Path) -> Result<Self, std::io::Error> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content).ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, "not an HLS media playlist")
        })
    }

    pub async fn write_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut file = File::create(path).await?;

        file.write_all(b"#EXTM3U\n").await?;
        file.write_all(format!("#EXT-X-VERSION:{}\n", self.version).as_bytes())
            .await?;
        file.write_all(format!("#EXT-X-TARGETDURATION:{}\n", self.target_duration).as_bytes())
            .await?;
        file.write_all(format!("#EXT-X-MEDIA-SEQUENCE:{}\n", self.media_sequence).as_bytes())
            .await?;

        for segment in &self.segments {
            file.write_all(format!("#EXTINF:{:.6},\n", segment.duration).as_bytes())
                .await?;
            file.write_all(segment.uri.as_bytes()).await?;
            file.write_all(b"\n").await?;
        }

        if self.end_list {
            file.write_all(b"#EXT-X-ENDLIST\n").await?;
        }

        file.flush().await
    }

    pub fn total_duration(&self) -> f64 {
        self.segments.iter().map(|s| s.duration).sum()
    }
}
