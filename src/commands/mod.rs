//! HTTP Commands
//!
//! Axum handlers for the two compatibility endpoints, the session API and
//! the health check, plus the shared error mapping and body helpers.

pub mod chat;
pub mod health;
pub mod report;
pub mod sessions;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::profile::ProfileContext;
use crate::models::response::CommandResponse;
use crate::utils::error::{AppError, AppResult};

/// Type code assumed when a compatibility request omits `mbtiType`.
pub const DEFAULT_TYPE_CODE: &str = "ESTJ";

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Validation(_) | AppError::Serialization(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Busy(_) => StatusCode::CONFLICT,
            AppError::MalformedReport(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::MissingCredential(_)
            | AppError::Llm(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(CommandResponse::<()>::err(self.to_string()))).into_response()
    }
}

/// Parse a JSON request body.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> AppResult<T> {
    serde_json::from_slice(body)
        .map_err(|e| AppError::invalid_input(format!("malformed request body: {}", e)))
}

/// Parse a JSON request body that may be empty.
pub(crate) fn parse_optional_body<T: DeserializeOwned + Default>(body: &Bytes) -> AppResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        Ok(T::default())
    } else {
        parse_body(body)
    }
}

/// Unframed streamed text, as the chat endpoints return it.
pub(crate) fn text_stream_response(body: Body) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/event-stream; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

/// `{"error": message}` with the given status, as the compatibility
/// endpoints answer.
pub(crate) fn compat_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// Request body shared by `/api/chat` and `/api/report`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatRequest {
    /// Checked by `parse_wire_messages`, so any JSON is accepted here
    #[serde(default)]
    pub messages: Value,
    #[serde(default)]
    pub mbti_type: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

impl CompatRequest {
    pub fn profile(&self) -> ProfileContext {
        let type_code = self
            .mbti_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_TYPE_CODE);
        ProfileContext::new(self.user_name.as_deref(), type_code)
    }
}
