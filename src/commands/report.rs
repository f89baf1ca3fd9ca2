//! Report Endpoint
//!
//! `POST /api/report`: stateless report generation over a client-held
//! transcript.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::json;

use super::{compat_error, parse_body, CompatRequest};
use crate::models::conversation::{parse_wire_messages, Conversation};
use crate::services::report::ReportOutcome;
use crate::state::AppState;

/// Answer with the raw generated report, or 503 carrying the sample report
/// as `mockData`.
pub async fn report(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let reporter = match state.reporter() {
        Ok(reporter) => reporter,
        Err(e) => return compat_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let Ok(request) = parse_body::<CompatRequest>(&body) else {
        return compat_error(StatusCode::BAD_REQUEST, "Invalid messages");
    };
    let Ok(turns) = parse_wire_messages(&request.messages) else {
        return compat_error(StatusCode::BAD_REQUEST, "Invalid messages");
    };

    let conversation = Conversation::from_turns(turns);
    match reporter.generate(&conversation, &request.profile()).await {
        ReportOutcome::Generated(value) => (StatusCode::OK, Json(value)).into_response(),
        ReportOutcome::Fallback {
            code,
            notice,
            report,
        } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": code,
                "message": notice,
                "mockData": report,
            })),
        )
            .into_response(),
    }
}
