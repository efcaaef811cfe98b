//! ffmpeg child-process transcoder.

use crate::domain::hls::{HlsLayout, MediaPlaylist, SEGMENT_DURATION_SECS};
use crate::ports::transcoder::{TranscodeError, Transcoder};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// stderr lines kept for the error report when ffmpeg fails.
const STDERR_TAIL_LINES: usize = 20;

/// Argument list producing a single H.264/AAC rendition with 3 second
/// segments and an unbounded playlist.
pub fn hls_args(source: &Path, layout: &HlsLayout) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::with_capacity(16);
    args.push("-y".into());
    args.push("-i".into());
    args.push(source.into());
    args.push("-c:v".into());
    args.push("libx264".into());
    args.push("-c:a".into());
    args.push("aac".into());
    args.push("-hls_time".into());
    args.push(SEGMENT_DURATION_SECS.to_string().into());
    args.push("-hls_list_size".into());
    args.push("0".into());
    args.push("-hls_segment_filename".into());
    args.push(layout.segment_pattern().into());
    args.push("-f".into());
    args.push("hls".into());
    args.push(layout.playlist_path().into());
    args
}

#[derive(Clone, Debug)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, source: &Path, layout: &HlsLayout) -> Result<(), TranscodeError> {
        let mut child = Command::new(&self.program)
            .args(hls_args(source, layout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| TranscodeError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::info!(stream = %layout.name, pid = ?child.id(), "ffmpeg started");

        let stderr = child.stderr.take();
        let stream = layout.name.to_string();
        let log_task = tokio::spawn(async move {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            if let Some(stderr) = stderr {
                let mut reader = BufReader::new(stderr);
                let mut buf = Vec::new();
                loop {
                    buf.clear();
                    match reader.read_until(b'\n', &mut buf).await {
                        Ok(0) => break,
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(stream = %stream, "reading ffmpeg stderr failed: {}", e);
                            break;
                        }
                    }
                    let line = String::from_utf8_lossy(&buf).trim_end().to_owned();
                    tracing::debug!(target: "ffmpeg", stream = %stream, "{}", line);
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }
            tail
        });

        let status = child.wait().await.map_err(TranscodeError::Wait)?;
        let tail = log_task.await.unwrap_or_default();

        if !status.success() {
            return Err(TranscodeError::Failed {
                status,
                stderr_tail: Vec::from(tail).join("\n"),
            });
        }

        let playlist_path = layout.playlist_path();
        let playlist = MediaPlaylist::read_from(&playlist_path)
            .await
            .map_err(|source| TranscodeError::MissingOutput {
                path: playlist_path,
                source,
            })?;

        tracing::info!(
            stream = %layout.name,
            segments = playlist.segments.len(),
            duration = playlist.total_duration(),
            "HLS stream generation complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stream::StreamName;
    use tempfile::tempdir;

    fn layout(root: &Path) -> HlsLayout {
        HlsLayout::new(root, StreamName::from_file_name("demo.mp4").unwrap())
    }

    #[test]
    fn test_hls_args() {
        let args = hls_args(Path::new("uploads/demo.mp4"), &layout(Path::new("streams")));
        let args: Vec<&str> = args.iter().map(|a| a.to_str().unwrap()).collect();

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "uploads/demo.mp4",
                "-c:v",
                "libx264",
                "-c:a",
                "aac",
                "-hls_time",
                "3",
                "-hls_list_size",
                "0",
                "-hls_segment_filename",
                "streams/demo/demo_%03d.ts",
                "-f",
                "hls",
                "streams/demo/demo.m3u8",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_a_spawn_error() {
        let dir = tempdir().unwrap();
        let transcoder = FfmpegTranscoder::new(dir.path().join("no-such-ffmpeg"));

        let result = transcoder
            .transcode(Path::new("demo.mp4"), &layout(dir.path()))
            .await;

        assert!(matches!(result, Err(TranscodeError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_a_failure() {
        let dir = tempdir().unwrap();
        let transcoder = FfmpegTranscoder::new("false");

        let result = transcoder
            .transcode(Path::new("demo.mp4"), &layout(dir.path()))
            .await;

        match result {
            Err(TranscodeError::Failed { status, .. }) => assert!(!status.success()),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stderr_survives_invalid_utf8() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let script = dir.path().join("fake-ffmpeg");
        std::fs::write(
            &script,
            "#!/bin/sh\nprintf 'title: caf\\351\\n' >&2\nsleep 0.2\necho 'conversion failed' >&2\nexit 3\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let transcoder = FfmpegTranscoder::new(&script);
        let result = transcoder
            .transcode(Path::new("demo.mp4"), &layout(dir.path()))
            .await;

        match result {
            Err(TranscodeError::Failed {
                status,
                stderr_tail,
            }) => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr_tail, "title: caf\u{FFFD}\nconversion failed");
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_clean_exit_without_playlist() {
        let dir = tempdir().unwrap();
        let transcoder = FfmpegTranscoder::new("true");

        let result = transcoder
            .transcode(Path::new("demo.mp4"), &layout(dir.path()))
            .await;

        assert!(matches!(result, Err(TranscodeError::MissingOutput { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_clean_exit_with_playlist() {
        let dir = tempdir().unwrap();
        let layout = layout(dir.path());
        std::fs::create_dir_all(&layout.dir).unwrap();
        let mut playlist = MediaPlaylist::new(3);
        playlist.add_segment(3.0, layout.segment_file_name(0));
        playlist.write_to(&layout.playlist_path()).await.unwrap();

        let transcoder = FfmpegTranscoder::new("true");

        transcoder
            .transcode(Path::new("demo.mp4"), &layout)
            .await
            .unwrap();
    }
}
