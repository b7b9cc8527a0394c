use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;

use super::error::ApiError;
use crate::config::VisitConfig;
use crate::models::{RequestMetadata, VisitorStats};
use crate::tracker::VisitorTracker;

pub struct AppState {
    pub tracker: Arc<VisitorTracker>,
    pub visit: VisitConfig,
    /// Public path of the visit endpoint, as the frontend should call it
    pub visit_endpoint: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

/// Visit settings consumed by the frontend's session detection
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSettingsResponse {
    pub session_timeout_ms: u64,
    pub new_visitor_indicator_ms: u64,
    pub local_storage_key: String,
    pub visit_endpoint: String,
}

/// Record a visit
pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<VisitorStats>, ApiError> {
    let metadata = RequestMetadata::from_headers(&headers);
    let tracker = Arc::clone(&state.tracker);

    // Panics in the store surface as a 500
    tokio::spawn(async move { tracker.increment_visitor_count(Some(&metadata)).await })
        .await
        .map(Json)
        .map_err(|e| {
            error!("Error in visit API: {}", e);
            ApiError::VisitUpdateFailed
        })
}

/// Current visit counts
pub async fn get_visits(
    State(state): State<Arc<AppState>>,
) -> Result<Json<VisitorStats>, ApiError> {
    let tracker = Arc::clone(&state.tracker);

    tokio::spawn(async move { tracker.get_visitor_count().await })
        .await
        .map(Json)
        .map_err(|e| {
            error!("Error in visit API: {}", e);
            ApiError::VisitReadFailed
        })
}

pub async fn visit_settings(State(state): State<Arc<AppState>>) -> Json<VisitSettingsResponse> {
    Json(VisitSettingsResponse {
        session_timeout_ms: state.visit.session_timeout_ms(),
        new_visitor_indicator_ms: state.visit.new_visitor_indicator_ms,
        local_storage_key: state.visit.local_storage_key.clone(),
        visit_endpoint: state.visit_endpoint.clone(),
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
