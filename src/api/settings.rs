use axum::{Json, extract::State};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, NotificationEvent};
use crate::services::links::normalize_image_url;
use crate::services::settings::{ImportantLink, SettingsMap};

/// Settings whose values are pasted image URLs and get Drive-link
/// normalization on save.
const IMAGE_SETTING_KEYS: &[&str] = &["logo_url", "divine_bg_url", "background_pattern_url"];

#[derive(Deserialize)]
pub struct SaveSettingsRequest {
    pub values: BTreeMap<String, String>,
    /// When omitted, the stored category list is kept as-is.
    pub categories: Option<Vec<String>>,
}

#[derive(Deserialize)]
pub struct SaveLinksRequest {
    pub links: Vec<ImportantLink>,
}

#[derive(Deserialize)]
pub struct SaveFooterRequest {
    pub values: BTreeMap<String, String>,
}

async fn load_settings(state: &AppState) -> Result<SettingsMap, ApiError> {
    let site = state.config().read().await.site.clone();
    let rows = state.store().get_all_settings().await?;

    let mut map = SettingsMap::from_rows(&rows, &site.default_categories, &site.default_links);
    map.apply_defaults(&site.default_values());
    Ok(map)
}

/// GET /settings
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SettingsMap>>, ApiError> {
    let map = load_settings(&state).await?;
    Ok(Json(ApiResponse::success(map)))
}

/// PUT /settings
pub async fn save_settings(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveSettingsRequest>,
) -> Result<Json<ApiResponse<SettingsMap>>, ApiError> {
    let mut map = load_settings(&state).await?;

    for (key, value) in payload.values {
        if IMAGE_SETTING_KEYS.contains(&key.as_str()) {
            map.set(key, normalize_image_url(&value));
        } else {
            map.set(key, value);
        }
    }

    if let Some(categories) = payload.categories {
        if categories.is_empty() {
            return Err(ApiError::validation(
                "At least one publication category is required",
            ));
        }
        map.categories = categories;
    }

    state.store().upsert_settings(map.to_rows()).await?;

    let _ = state.event_bus().send(NotificationEvent::SettingsChanged);

    Ok(Json(ApiResponse::success(map)))
}

/// GET /settings/links
pub async fn get_links(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ImportantLink>>>, ApiError> {
    let map = load_settings(&state).await?;
    Ok(Json(ApiResponse::success(map.links)))
}

/// PUT /settings/links
pub async fn save_links(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveLinksRequest>,
) -> Result<Json<ApiResponse<Vec<ImportantLink>>>, ApiError> {
    for link in &payload.links {
        if link.title.trim().is_empty() || link.url.trim().is_empty() {
            return Err(ApiError::validation("Links need both a title and a URL"));
        }
    }

    let mut map = load_settings(&state).await?;
    map.links = payload.links;

    state.store().upsert_settings(map.to_rows()).await?;

    let _ = state.event_bus().send(NotificationEvent::SettingsChanged);

    Ok(Json(ApiResponse::success(map.links)))
}

/// PUT /settings/footer
/// The footer screen only ever touches its own keys; anything else in the
/// payload is rejected rather than silently saved.
pub async fn save_footer(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveFooterRequest>,
) -> Result<Json<ApiResponse<SettingsMap>>, ApiError> {
    if let Some(key) = payload.values.keys().find(|k| !k.starts_with("footer_")) {
        return Err(ApiError::validation(format!(
            "'{key}' is not a footer setting"
        )));
    }

    let mut map = load_settings(&state).await?;
    for (key, value) in payload.values {
        map.set(key, value);
    }

    state.store().upsert_settings(map.to_rows()).await?;

    let _ = state.event_bus().send(NotificationEvent::SettingsChanged);

    Ok(Json(ApiResponse::success(map)))
}
