use axum::{
    Json,
    extract::{Query, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState};
use crate::entities::visitor_logs;
use crate::services::analytics::{self, AnalyticsSummary};

const DEFAULT_LOG_LIMIT: u64 = 50;
const MAX_LOG_LIMIT: u64 = 500;

#[derive(Deserialize)]
pub struct RecordVisitRequest {
    pub device: Option<String>,
    pub platform: Option<String>,
    pub path: String,
}

#[derive(Deserialize)]
pub struct LogsQuery {
    pub limit: Option<u64>,
}

#[derive(Deserialize)]
pub struct PruneQuery {
    pub older_than_days: Option<i64>,
}

/// POST /visits
pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<RecordVisitRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if payload.path.is_empty() {
        return Err(ApiError::validation("Path is required"));
    }

    let user_agent = headers
        .get("user-agent")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    analytics::record_visit(
        state.store(),
        state.event_bus(),
        payload.device,
        payload.platform,
        payload.path,
        user_agent,
    )
    .await?;

    Ok(Json(ApiResponse::success(())))
}

/// GET /analytics/summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<AnalyticsSummary>>, ApiError> {
    let summary = analytics::summary(state.store()).await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// GET /analytics/logs?limit=N
pub async fn get_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<ApiResponse<Vec<visitor_logs::Model>>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LOG_LIMIT)
        .min(MAX_LOG_LIMIT);

    let logs = state.store().recent_visits(limit).await?;
    Ok(Json(ApiResponse::success(logs)))
}

/// DELETE /analytics/logs
/// With `older_than_days` prunes by age, without it clears everything.
pub async fn clear_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PruneQuery>,
) -> Result<Json<ApiResponse<u64>>, ApiError> {
    let removed = match query.older_than_days {
        Some(days) if days <= 0 => {
            return Err(ApiError::validation("older_than_days must be positive"));
        }
        Some(days) => state.store().prune_visits(days).await?,
        None => {
            let total = state.store().total_visits().await?;
            state.store().clear_visits().await?;
            total
        }
    };

    Ok(Json(ApiResponse::success(removed)))
}
