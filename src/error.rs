//! Request-boundary errors and their HTTP rendering.
//!
//! Clients only ever see a status code and a fixed plain-text message; the
//! underlying cause is logged.

use crate::ports::registry::RegistryError;
use crate::ports::transcoder::TranscodeError;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No files were uploaded.")]
    NoFiles,

    /// Files were sent, none under the expected field.
    #[error("No {field} file was uploaded.")]
    MissingField { field: String },

    #[error("Invalid file name.")]
    InvalidFileName,

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("saving upload failed: {0}")]
    SaveUpload(#[source] std::io::Error),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("reading streams directory failed: {0}")]
    ReadStreams(#[source] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[source] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoFiles | AppError::MissingField { .. } | AppError::InvalidFileName => {
                StatusCode::BAD_REQUEST
            }
            AppError::Multipart(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text sent to the client.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NoFiles | AppError::MissingField { .. } | AppError::InvalidFileName => {
                self.to_string()
            }
            AppError::Multipart(e) => e.body_text(),
            AppError::SaveUpload(_) => String::from("Error saving uploaded file."),
            AppError::Transcode(_) => String::from("Error generating HLS stream."),
            AppError::ReadStreams(_) => String::from("Error reading streams directory."),
            AppError::Registry(_) | AppError::Internal(_) | AppError::Task(_) => {
                String::from("Internal Server Error")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "request rejected");
        }
        (status, self.public_message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_no_files_is_bad_request() {
        let err = AppError::NoFiles;
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "No files were uploaded.");
    }

    #[test]
    fn test_missing_field_names_the_field() {
        let err = AppError::MissingField {
            field: "video".to_owned(),
        };
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "No video file was uploaded.");
    }

    #[test]
    fn test_transcode_failure_hides_details() {
        let err = AppError::from(TranscodeError::Spawn {
            program: PathBuf::from("/opt/ffmpeg"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Error generating HLS stream.");

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_save_failure_message() {
        let err = AppError::SaveUpload(std::io::Error::from(std::io::ErrorKind::Other));
        assert_eq!(err.public_message(), "Error saving uploaded file.");
    }
}
