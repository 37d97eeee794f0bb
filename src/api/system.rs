use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, SystemStatus};

/// GET /system/status
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SystemStatus>>, ApiError> {
    let database_ok = state.store().ping().await.is_ok();

    let total_publications = state.store().list_publications(None, None).await?.len();
    let total_visits = state.store().total_visits().await?;

    Ok(Json(ApiResponse::success(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: state.start_time.elapsed().as_secs(),
        total_publications,
        total_visits,
        database_ok,
    })))
}

/// GET /health
/// Liveness probe, no auth and no body to parse.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.store().ping().await.is_ok() {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Database unreachable")
    }
}
