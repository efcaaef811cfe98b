//! Server configuration loaded from the environment.

use std::env;
use std::path::{Path, PathBuf};

/// How a successful upload is answered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadResponse {
    /// `200` with `{streamUrl, streamHlsUrl}`.
    Json,
    /// `303` to the playback page.
    Redirect,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    #[error("could not resolve working directory: {0}")]
    WorkingDir(#[from] std::io::Error),
}

/// Configuration for the upload/transcode/serve server.
///
/// Every directory is absolute once loaded; components receive the paths they
/// need from here and never look them up on their own.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: u16,
    /// Externally reachable base used in generated stream URLs, without trailing slash
    pub public_base_url: String,
    /// Where raw uploads are written, under their sanitized file name
    pub uploads_dir: PathBuf,
    /// Root of the generated HLS output, one directory per stream
    pub streams_dir: PathBuf,
    /// HTML pages served by the surface
    pub views_dir: PathBuf,
    /// JSON registry of published streams
    pub registry_path: PathBuf,
    /// Transcoder program, looked up on PATH when not absolute
    pub ffmpeg_path: PathBuf,
    /// Multipart field carrying the video
    pub upload_field: String,
    pub upload_response: UploadResponse,
}

impl ServerConfig {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let cwd = env::current_dir()?;
        Self::from_lookup(&cwd, |key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source, resolving
    /// relative paths against `base`.
    pub fn from_lookup<F>(base: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_owned());

        let port = var("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidVar {
                var: "PORT",
                reason: e.to_string(),
            })?;

        let public_base_url = match lookup("PUBLIC_BASE_URL") {
            Some(url) => parse_base_url(&url)?,
            None => format!("http://localhost:{}", port),
        };

        let upload_response = match var("UPLOAD_RESPONSE", "redirect").to_ascii_lowercase().as_str() {
            "json" => UploadResponse::Json,
            "redirect" => UploadResponse::Redirect,
            other => {
                return Err(ConfigError::InvalidVar {
                    var: "UPLOAD_RESPONSE",
                    reason: format!("expected `json` or `redirect`, got `{}`", other),
                })
            }
        };

        let upload_field = var("UPLOAD_FIELD", "video");
        if upload_field.is_empty() {
            return Err(ConfigError::InvalidVar {
                var: "UPLOAD_FIELD",
                reason: "must not be empty".to_owned(),
            });
        }

        let streams_dir = absolute(base, var("STREAMS_DIR", "streams"));
        // ffmpeg reads the segment path as a printf pattern.
        if streams_dir.to_string_lossy().contains('%') {
            return Err(ConfigError::InvalidVar {
                var: "STREAMS_DIR",
                reason: format!("`{}` must not contain `%`", streams_dir.display()),
            });
        }

        Ok(Self {
            addr: var("ADDR", "127.0.0.1"),
            port,
            public_base_url,
            uploads_dir: absolute(base, var("UPLOADS_DIR", "uploads")),
            streams_dir,
            views_dir: absolute(base, var("VIEWS_DIR", "views")),
            registry_path: absolute(base, var("REGISTRY_PATH", "streams.json")),
            ffmpeg_path: PathBuf::from(var("FFMPEG_PATH", "ffmpeg")),
            upload_field,
            upload_response,
        })
    }

    /// Defaults rooted at `root`, handy for embedding and tests.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            addr: String::from("127.0.0.1"),
            port: 3000,
            public_base_url: String::from("http://localhost:3000"),
            uploads_dir: root.join("uploads"),
            streams_dir: root.join("streams"),
            views_dir: root.join("views"),
            registry_path: root.join("streams.json"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            upload_field: String::from("video"),
            upload_response: UploadResponse::Redirect,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

fn parse_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidVar {
            var: "PUBLIC_BASE_URL",
            reason: format!("`{}` is not an http(s) URL", url),
        });
    }
    Ok(trimmed.to_owned())
}

fn absolute(base: &Path, path: String) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
