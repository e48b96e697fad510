//! REST endpoints for intake status.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::intake::ProfileCollectionController;

/// Shared state for intake routes.
#[derive(Clone)]
pub struct IntakeRouteState {
    pub controller: Arc<ProfileCollectionController>,
}

/// GET /api/intake/status
///
/// Returns the current collection phase, which fields are covered, what is
/// still missing, and the record id once saved.
async fn get_status(State(state): State<IntakeRouteState>) -> impl IntoResponse {
    Json(state.controller.status().await)
}

/// GET /api/intake/profile
///
/// Returns the saved profile record, or 404 until it has been persisted.
async fn get_profile(State(state): State<IntakeRouteState>) -> impl IntoResponse {
    let status = state.controller.status().await;
    if status.record_id.is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No profile saved yet"})),
        )
            .into_response();
    }
    let record = state.controller.profile().await.to_record();
    Json(serde_json::to_value(record).unwrap_or_default()).into_response()
}

/// Build the intake REST routes.
pub fn intake_routes(state: IntakeRouteState) -> Router {
    Router::new()
        .route("/api/intake/status", get(get_status))
        .route("/api/intake/profile", get(get_profile))
        .with_state(state)
}
