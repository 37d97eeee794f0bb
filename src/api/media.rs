use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, MediaItemDto};
use crate::services::links::normalize_image_url;

#[derive(Deserialize)]
pub struct AddMediaRequest {
    pub url: String,
    pub title: String,
    pub file_name: Option<String>,
}

/// GET /media
pub async fn list_media(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<MediaItemDto>>>, ApiError> {
    let items = state.store().list_media().await?;

    Ok(Json(ApiResponse::success(
        items.into_iter().map(MediaItemDto::from).collect(),
    )))
}

/// POST /media
pub async fn add_media(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddMediaRequest>,
) -> Result<Json<ApiResponse<MediaItemDto>>, ApiError> {
    if payload.url.trim().is_empty() {
        return Err(ApiError::validation("URL is required"));
    }
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }

    let item = state
        .store()
        .add_media(
            normalize_image_url(&payload.url),
            payload.title,
            payload.file_name,
        )
        .await?;

    Ok(Json(ApiResponse::success(MediaItemDto::from(item))))
}

/// DELETE /media/{id}
pub async fn delete_media(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let deleted = state.store().delete_media(id).await?;

    if !deleted {
        return Err(ApiError::not_found("Media item", id));
    }

    Ok(Json(ApiResponse::success(())))
}
