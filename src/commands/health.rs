//! Health Check
//!
//! `GET /health`

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::models::response::HealthResponse;
use crate::state::AppState;

/// Report service identity and whether the AI endpoints are usable.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(state.health())
}
