use super::AppState;
use crate::domain::stream::StreamRecord;
use crate::error::AppError;
use axum::{extract::State, Json};
use serde::Serialize;

pub async fn list_streams(
    State(state): State<AppState>,
) -> Result<Json<Vec<StreamRecord>>, AppError> {
    Ok(Json(state.publisher.registry().list_all().await?))
}

#[derive(Debug, Serialize)]
pub struct CleanReply {
    pub data: &'static str,
}

pub async fn clean(State(state): State<AppState>) -> Result<Json<CleanReply>, AppError> {
    state.publisher.clean().await?;
    Ok(Json(CleanReply {
        data: "Cleanup Complete!",
    }))
}
