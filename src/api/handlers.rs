//! Data center endpoint handlers

use crate::api::types::{ApiResponse, Empty};
use crate::datasets::RefreshKind;
use crate::services::notification_service::{Notification, NotificationCenter};
use crate::services::refresh_controller::{
    DataCenterSnapshot, DatasetRefreshController, TriggerOutcome,
};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

/// Shared state for the API handlers
pub struct DataCenterState {
    pub controller: Arc<DatasetRefreshController>,
    pub notifications: Arc<NotificationCenter>,
}

impl DataCenterState {
    pub fn new(
        controller: Arc<DatasetRefreshController>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            controller,
            notifications,
        }
    }
}

impl From<&AppState> for DataCenterState {
    fn from(state: &AppState) -> Self {
        Self::new(state.controller.clone(), state.notifications.clone())
    }
}

type SharedState = State<Arc<DataCenterState>>;

/// Health check - GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::<Empty>::success_with_message(
        "Qronos data center is running",
    ))
}

/// Current state - GET /api/data-center
pub async fn get_data_center(State(state): SharedState) -> Json<ApiResponse<DataCenterSnapshot>> {
    Json(ApiResponse::success(state.controller.snapshot()))
}

/// Re-read status from the backend - POST /api/data-center/status
pub async fn refresh_status(State(state): SharedState) -> Json<ApiResponse<DataCenterSnapshot>> {
    state.controller.refresh_status().await;
    Json(ApiResponse::success(state.controller.snapshot()))
}

/// Primary action - POST /api/data-center/refresh
pub async fn refresh(State(state): SharedState) -> impl IntoResponse {
    info!("Primary refresh requested");
    outcome_response(state.controller.decide_action().await)
}

/// Full download - POST /api/data-center/refresh/full
pub async fn refresh_full(State(state): SharedState) -> impl IntoResponse {
    outcome_response(state.controller.trigger_full_refresh().await)
}

/// Incremental download - POST /api/data-center/refresh/incremental
pub async fn refresh_incremental(State(state): SharedState) -> impl IntoResponse {
    outcome_response(state.controller.trigger_incremental_refresh().await)
}

/// Recent notifications - GET /api/data-center/notifications
pub async fn get_notifications(State(state): SharedState) -> Json<ApiResponse<Vec<Notification>>> {
    Json(ApiResponse::success(state.notifications.recent()))
}

fn outcome_response(outcome: TriggerOutcome) -> (StatusCode, Json<ApiResponse<TriggerOutcome>>) {
    let (status, message) = match &outcome {
        TriggerOutcome::Completed { kind, .. } => (
            StatusCode::OK,
            format!("{} refresh completed", kind_name(*kind)),
        ),
        TriggerOutcome::Rejected { running, .. } => (
            StatusCode::CONFLICT,
            format!("{} refresh already running", kind_name(*running)),
        ),
        TriggerOutcome::Failed { kind, reason } => (
            StatusCode::BAD_GATEWAY,
            format!("{} refresh failed: {}", kind_name(*kind), reason),
        ),
    };

    let body = if status == StatusCode::OK {
        ApiResponse::success_with_data_and_message(outcome, message)
    } else {
        ApiResponse::error_with_data(outcome, message)
    };
    (status, Json(body))
}

fn kind_name(kind: RefreshKind) -> &'static str {
    match kind {
        RefreshKind::Full => "Full",
        RefreshKind::Incremental => "Incremental",
    }
}
