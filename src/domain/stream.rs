use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static pattern"))
}

/// Sanitize a client supplied file name into something safe to store on disk
/// and embed in a URL. Only the last path component is kept.
///
/// Returns `None` when nothing usable remains.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
    let cleaned = unsafe_chars().replace_all(last, "_");
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_owned())
    }
}

/// Identifier of a generated stream: the stem of the uploaded file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamName(String);

impl StreamName {
    /// Derive the name from an uploaded file name, dropping its extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let sanitized = sanitize_file_name(file_name)?;
        let stem = Path::new(&sanitized).file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        Some(Self(stem.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry entry for a published stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRecord {
    pub stream_name: StreamName,
    /// Public URL of the playlist
    pub stream_url: String,
    /// Public URL of the playback page
    pub stream_hls_url: String,
}

impl StreamRecord {
    /// Build the record for `name` as reachable from `base_url`.
    pub fn new(base_url: &str, name: StreamName) -> Self {
        Self {
            stream_url: format!("{}/streams/{}/{}.m3u8", base_url, name, name),
            stream_hls_url: format!("{}/streamhls/{}", base_url, name),
            stream_name: name,
        }
    }
}
