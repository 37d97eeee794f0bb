use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, NotificationEvent, PublicationDto};
use crate::db::PublicationInput;
use crate::services::links::normalize_image_url;

#[derive(Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePublicationRequest {
    pub title: String,
    pub description: Option<String>,
    pub cover_url: String,
    pub flipbook_url: String,
    /// Defaults to the configured publish-form category.
    pub category: Option<String>,
    /// Defaults to the current year.
    pub year: Option<String>,
    /// Defaults to true: a freshly published issue carries the latest badge.
    pub is_latest: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdatePublicationRequest {
    pub title: String,
    pub description: Option<String>,
    pub cover_url: String,
    pub flipbook_url: String,
    pub category: String,
    pub year: String,
    pub is_latest: bool,
}

/// GET /publications
pub async fn list_publications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<PublicationDto>>>, ApiError> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let publications = state.store().list_publications(category, search).await?;

    Ok(Json(ApiResponse::success(
        publications.into_iter().map(PublicationDto::from).collect(),
    )))
}

/// POST /publications
pub async fn create_publication(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePublicationRequest>,
) -> Result<Json<ApiResponse<PublicationDto>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }
    if payload.flipbook_url.trim().is_empty() {
        return Err(ApiError::validation("Flipbook URL is required"));
    }

    let default_category = state.config().read().await.site.default_category.clone();

    let input = PublicationInput {
        title: payload.title,
        description: payload.description,
        cover_url: normalize_image_url(&payload.cover_url),
        flipbook_url: payload.flipbook_url,
        category: payload
            .category
            .filter(|c| !c.is_empty())
            .unwrap_or(default_category),
        year: payload
            .year
            .filter(|y| !y.is_empty())
            .unwrap_or_else(|| chrono::Utc::now().format("%Y").to_string()),
        is_latest: payload.is_latest.unwrap_or(true),
    };

    let publication = state.store().create_publication(input).await?;

    let _ = state.event_bus().send(NotificationEvent::PublicationCreated {
        id: publication.id,
        title: publication.title.clone(),
    });

    Ok(Json(ApiResponse::success(PublicationDto::from(publication))))
}

/// PUT /publications/{id}
pub async fn update_publication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePublicationRequest>,
) -> Result<Json<ApiResponse<PublicationDto>>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::validation("Title is required"));
    }

    let input = PublicationInput {
        title: payload.title,
        description: payload.description,
        cover_url: normalize_image_url(&payload.cover_url),
        flipbook_url: payload.flipbook_url,
        category: payload.category,
        year: payload.year,
        is_latest: payload.is_latest,
    };

    let publication = state
        .store()
        .update_publication(id, input)
        .await?
        .ok_or_else(|| ApiError::not_found("Publication", id))?;

    let _ = state.event_bus().send(NotificationEvent::PublicationUpdated {
        id: publication.id,
        title: publication.title.clone(),
    });

    Ok(Json(ApiResponse::success(PublicationDto::from(publication))))
}

/// DELETE /publications/{id}
pub async fn delete_publication(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let deleted = state.store().delete_publication(id).await?;

    if !deleted {
        return Err(ApiError::not_found("Publication", id));
    }

    let _ = state
        .event_bus()
        .send(NotificationEvent::PublicationDeleted { id });

    Ok(Json(ApiResponse::success(())))
}
