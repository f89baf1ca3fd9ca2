//! Session Commands
//!
//! Session-scoped API. The server owns the transcript: streamed replies are
//! folded into the session as they are forwarded to the client.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use super::{parse_body, parse_optional_body, text_stream_response};
use crate::models::profile::ProfileScores;
use crate::models::report::StoredReport;
use crate::models::response::CommandResponse;
use crate::services::coach::{ChatEvent, ChatEventStream};
use crate::services::session::{SessionStore, SessionView};
use crate::state::AppState;
use crate::utils::error::AppResult;

type ApiResult<T> = AppResult<Json<CommandResponse<T>>>;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub ei: i32,
    pub sn: i32,
    pub tf: i32,
    pub jp: i32,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateInputRequest {
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendMessageRequest {
    /// Falls back to the buffered input when absent
    #[serde(default)]
    pub content: Option<String>,
}

/// Routes under `/api/sessions`.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/profile", put(update_profile))
        .route("/api/sessions/{id}/input", put(update_input))
        .route("/api/sessions/{id}/greeting", post(greeting))
        .route("/api/sessions/{id}/messages", post(send_message))
        .route("/api/sessions/{id}/report", post(generate_report))
        .route("/api/sessions/{id}/reset", post(reset_session))
}

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<SessionView> {
    let request: CreateSessionRequest = parse_optional_body(&body)?;
    let view = state.sessions().create(request.user_name.as_deref()).await;
    Ok(Json(CommandResponse::ok(view)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionView> {
    Ok(Json(CommandResponse::ok(state.sessions().get(id).await?)))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<SessionView> {
    let request: UpdateProfileRequest = parse_body(&body)?;
    let scores = ProfileScores::new(request.ei, request.sn, request.tf, request.jp);
    let view = state
        .sessions()
        .set_profile(id, scores, request.user_name.as_deref())
        .await?;
    Ok(Json(CommandResponse::ok(view)))
}

pub async fn update_input(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> ApiResult<SessionView> {
    let request: UpdateInputRequest = parse_body(&body)?;
    let view = state.sessions().set_input(id, request.text).await?;
    Ok(Json(CommandResponse::ok(view)))
}

/// Stream the opening greeting.
pub async fn greeting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let coach = state.coach()?;
    let profile = state.sessions().begin_greeting(id).await?;
    let events = match coach.greeting(&profile) {
        Ok(events) => events,
        Err(e) => {
            state.sessions().settle_send(id).await?;
            return Err(e);
        }
    };
    Ok(fold_and_forward(Arc::clone(state.sessions()), id, events))
}

/// Append a user message and stream the reply.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> AppResult<Response> {
    let coach = state.coach()?;
    let request: SendMessageRequest = parse_optional_body(&body)?;
    let chat = state.sessions().begin_send(id, request.content).await?;
    let events = match coach.send(&chat.turns, &chat.profile) {
        Ok(events) => events,
        Err(e) => {
            state.sessions().settle_send(id).await?;
            return Err(e);
        }
    };
    Ok(fold_and_forward(Arc::clone(state.sessions()), id, events))
}

/// Generate and store the report. A fallback is stored as a sample.
pub async fn generate_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StoredReport> {
    let reporter = state.reporter()?;
    let request = state.sessions().begin_report(id).await?;
    let outcome = reporter
        .generate(&request.conversation, &request.profile)
        .await;
    let stored = state.sessions().complete_report(id, outcome).await?;
    Ok(Json(CommandResponse::ok(stored)))
}

pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<SessionView> {
    Ok(Json(CommandResponse::ok(state.sessions().reset(id).await?)))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    state.sessions().remove(id).await?;
    Ok(Json(CommandResponse::ok(())))
}

/// Fold every event into the session while forwarding fragment text to the
/// response body. Folding continues if the client disconnects.
fn fold_and_forward(store: Arc<SessionStore>, id: Uuid, mut events: ChatEventStream) -> Response {
    let (tx, rx) = mpsc::channel::<String>(64);

    tokio::spawn(async move {
        let mut client_gone = false;
        let mut terminated = false;
        while let Some(event) = events.next().await {
            if store.apply_chat_event(id, &event).await.is_err() {
                tracing::debug!(session_id = %id, "session removed mid-stream");
                return;
            }
            terminated |= event.is_terminal();
            if let ChatEvent::Fragment { text, .. } = event {
                if !client_gone && tx.send(text).await.is_err() {
                    tracing::debug!(session_id = %id, "client disconnected, still folding");
                    client_gone = true;
                }
            }
        }
        if !terminated {
            let _ = store.settle_send(id).await;
        }
    });

    let chunks = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    text_stream_response(Body::from_stream(chunks))
}
