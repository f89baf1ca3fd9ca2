//! Chat Endpoint
//!
//! `POST /api/chat`: stateless streamed coach reply. The client owns the
//! transcript and resends it whole with every request.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use bytes::Bytes;
use tokio_stream::StreamExt;

use super::{compat_error, parse_body, text_stream_response, CompatRequest};
use crate::models::conversation::parse_wire_messages;
use crate::services::coach::ChatEvent;
use crate::state::AppState;

/// Stream the reply to the newest message as raw text.
///
/// The credential is checked before the body is read. A failure before any
/// text arrives is answered with a 500; a later failure ends the body early.
pub async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let coach = match state.coach() {
        Ok(coach) => coach,
        Err(e) => return compat_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let Ok(request) = parse_body::<CompatRequest>(&body) else {
        return compat_error(StatusCode::BAD_REQUEST, "Invalid messages");
    };
    let Ok(turns) = parse_wire_messages(&request.messages) else {
        return compat_error(StatusCode::BAD_REQUEST, "Invalid messages");
    };

    let mut events = match coach.send(&turns, &request.profile()) {
        Ok(events) => events,
        Err(e) => {
            tracing::info!(error = %e, "chat request rejected");
            return compat_error(StatusCode::BAD_REQUEST, "Invalid messages");
        }
    };

    let mut first = None;
    while let Some(event) = events.next().await {
        match event {
            ChatEvent::Started { .. } => continue,
            ChatEvent::Fragment { text, .. } => {
                first = Some(text);
                break;
            }
            ChatEvent::Finished { .. } => break,
            ChatEvent::Failed { .. } => {
                return compat_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
            }
        }
    }

    let rest = events.filter_map(|event| match event {
        ChatEvent::Fragment { text, .. } => Some(text),
        _ => None,
    });
    let chunks = tokio_stream::iter(first)
        .chain(rest)
        .map(Ok::<_, Infallible>);

    text_stream_response(Body::from_stream(chunks))
}
