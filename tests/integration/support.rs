//! Shared fixtures: a scripted provider and router helpers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use strengths_coach::models::settings::AppConfig;
use strengths_coach::server::build_router;
use strengths_coach::state::AppState;
use strengths_coach_core::streaming::UnifiedStreamEvent;
use strengths_coach_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
    StopReason, UsageStats,
};

/// One scripted provider call.
#[derive(Clone)]
pub enum Script {
    /// Stream these fragments, then succeed
    Stream(Vec<String>),
    /// Stream these fragments, then fail
    StreamThenFail(Vec<String>, LlmError),
    /// Answer a non-streamed call with this text
    Text(String),
    /// Fail a non-streamed call
    Fail(LlmError),
}

/// Provider that replays scripts in order and records every request.
pub struct ScriptedProvider {
    scripts: Mutex<Vec<Script>>,
    pub requests: Mutex<Vec<Vec<Message>>>,
    config: ProviderConfig,
}

impl ScriptedProvider {
    pub fn new(scripts: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            scripts: Mutex::new(scripts),
            requests: Mutex::new(Vec::new()),
            config: ProviderConfig::default(),
        })
    }

    fn next_script(&self, messages: Vec<Message>) -> Script {
        self.requests.lock().unwrap().push(messages);
        let mut scripts = self.scripts.lock().unwrap();
        if scripts.is_empty() {
            Script::Fail(LlmError::Other {
                message: "no scripted response left".to_string(),
            })
        } else {
            scripts.remove(0)
        }
    }
}

fn response(content: String) -> LlmResponse {
    LlmResponse {
        content: Some(content),
        stop_reason: StopReason::EndTurn,
        usage: UsageStats::default(),
        model: "scripted-model".to_string(),
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        _system: Option<String>,
        _options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        match self.next_script(messages) {
            Script::Text(text) => Ok(response(text)),
            Script::Fail(error) | Script::StreamThenFail(_, error) => Err(error),
            Script::Stream(fragments) => Ok(response(fragments.concat())),
        }
    }

    async fn stream_message(
        &self,
        messages: Vec<Message>,
        _system: Option<String>,
        tx: mpsc::Sender<UnifiedStreamEvent>,
        _options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let (fragments, error) = match self.next_script(messages) {
            Script::Stream(fragments) => (fragments, None),
            Script::StreamThenFail(fragments, error) => (fragments, Some(error)),
            Script::Text(text) => (vec![text], None),
            Script::Fail(error) => (Vec::new(), Some(error)),
        };
        for fragment in &fragments {
            let _ = tx
                .send(UnifiedStreamEvent::TextDelta {
                    content: fragment.clone(),
                })
                .await;
        }
        match error {
            Some(error) => Err(error),
            None => Ok(response(fragments.concat())),
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

pub fn stream(fragments: &[&str]) -> Script {
    Script::Stream(fragments.iter().map(|s| s.to_string()).collect())
}

pub fn quota_error() -> LlmError {
    LlmError::RateLimited {
        message: "RESOURCE_EXHAUSTED".to_string(),
        retry_after: None,
    }
}

pub fn state_with(chat: Vec<Script>, report: Vec<Script>) -> Arc<AppState> {
    Arc::new(AppState::with_providers(
        AppConfig::default(),
        ScriptedProvider::new(chat),
        ScriptedProvider::new(report),
    ))
}

pub fn state_without_credential() -> Arc<AppState> {
    Arc::new(AppState::with_api_key(AppConfig::default(), None).unwrap())
}

/// Send one request through the router and collect the whole body.
pub async fn call(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(json) => Body::from(json.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Like [`call`], parsing the body as JSON.
pub async fn call_json(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, text) = call(router, method, uri, body).await;
    (status, serde_json::from_str(&text).unwrap())
}

pub fn router(state: Arc<AppState>) -> Router {
    build_router(state)
}
