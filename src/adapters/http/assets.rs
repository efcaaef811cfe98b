use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

pub const HLS_PLAYLIST_TYPE: &str = "application/vnd.apple.mpegurl";
pub const MPEG_TS_TYPE: &str = "video/MP2T";

/// Media type forced for generated HLS files, judged by extension only.
pub fn hls_media_type(path: &str) -> Option<&'static str> {
    if path.ends_with(".m3u8") {
        Some(HLS_PLAYLIST_TYPE)
    } else if path.ends_with(".ts") {
        Some(MPEG_TS_TYPE)
    } else {
        None
    }
}

/// Override the guessed content type of served playlists and segments.
pub async fn hls_content_type(req: Request, next: Next) -> Response {
    let media_type = hls_media_type(req.uri().path());
    let mut response = next.run(req).await;

    if let Some(media_type) = media_type {
        if response.status().is_success() {
            response
                .headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(media_type));
        }
    }
    response
}
