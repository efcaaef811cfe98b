use super::AppState;
use crate::config::UploadResponse;
use crate::domain::stream::{sanitize_file_name, StreamName};
use crate::error::AppError;
use axum::{
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadReply {
    stream_url: String,
    stream_hls_url: String,
}

// Accepts one video file, transcodes it and answers once ffmpeg is done.
pub async fn upload_media(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut saw_file = false;

    while let Some(field) = multipart.next_field().await? {
        let raw_name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => continue,
        };
        saw_file = true;

        if field.name() != Some(&*state.upload_field) {
            tracing::debug!(field = ?field.name(), "ignoring unexpected file field");
            continue;
        }

        let file_name = sanitize_file_name(&raw_name).ok_or(AppError::InvalidFileName)?;
        let stream_name = StreamName::from_file_name(&file_name).ok_or(AppError::InvalidFileName)?;

        let path = state
            .publisher
            .store()
            .save_upload(&file_name, field)
            .await
            .map_err(AppError::SaveUpload)?;
        tracing::info!(path = %path.display(), "saved upload");

        // Runs to completion even if the client disconnects.
        let publisher = Arc::clone(&state.publisher);
        let record = tokio::spawn(async move { publisher.publish(&path, stream_name).await })
            .await??;

        return Ok(match state.upload_response {
            UploadResponse::Json => Json(UploadReply {
                stream_url: record.stream_url,
                stream_hls_url: record.stream_hls_url,
            })
            .into_response(),
            UploadResponse::Redirect => {
                Redirect::to(&format!("/streamhls/{}", record.stream_name)).into_response()
            }
        });
    }

    Err(if saw_file {
        AppError::MissingField {
            field: state.upload_field.to_string(),
        }
    } else {
        AppError::NoFiles
    })
}
