use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, NoticeDto, NotificationEvent};

#[derive(Deserialize)]
pub struct PostNoticeRequest {
    pub content: String,
}

/// GET /notices
pub async fn list_notices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<NoticeDto>>>, ApiError> {
    let notices = state.store().list_notices().await?;

    Ok(Json(ApiResponse::success(
        notices.into_iter().map(NoticeDto::from).collect(),
    )))
}

/// POST /notices
pub async fn post_notice(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PostNoticeRequest>,
) -> Result<Json<ApiResponse<NoticeDto>>, ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::validation("Notice content is required"));
    }

    let notice = state.store().add_notice(payload.content).await?;

    let _ = state
        .event_bus()
        .send(NotificationEvent::NoticePosted { id: notice.id });

    Ok(Json(ApiResponse::success(NoticeDto::from(notice))))
}

/// DELETE /notices/{id}
pub async fn delete_notice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let deleted = state.store().delete_notice(id).await?;

    if !deleted {
        return Err(ApiError::not_found("Notice", id));
    }

    let _ = state
        .event_bus()
        .send(NotificationEvent::NoticeDeleted { id });

    Ok(Json(ApiResponse::success(())))
}
