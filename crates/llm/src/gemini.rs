//! Gemini Provider
//!
//! Implementation of the LlmProvider trait for the Google Generative
//! Language API. Streaming goes through `streamGenerateContent?alt=sse`;
//! single completions use `generateContent` and honor JSON output mode.

use async_trait::async_trait;
use serde_json::json;
use strengths_coach_core::streaming::UnifiedStreamEvent;
use tokio::sync::mpsc;
use url::Url;

use crate::http_client::build_http_client;
use crate::provider::{missing_api_key_error, parse_http_error, stream_error, LlmProvider};
use crate::streaming_adapters::gemini::GenerateContentResponse;
use crate::streaming_adapters::{pump_sse, GeminiAdapter};
use crate::types::{
    LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, MessageRole, ProviderConfig,
    ResponseFormat, StopReason, UsageStats,
};

/// Default Generative Language API endpoint
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

/// User turn inserted when the history would otherwise open with the model.
///
/// Gemini rejects a `contents` array whose first entry has role `model`.
pub const SESSION_START_TURN: &str = "（セッション開始）";

/// Gemini provider
pub struct GeminiProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given configuration
    pub fn new(config: ProviderConfig) -> LlmResult<Self> {
        let client = build_http_client(config.timeout_secs)?;
        Ok(Self { config, client })
    }

    fn api_key(&self) -> LlmResult<&str> {
        self.config
            .api_key()
            .ok_or_else(|| missing_api_key_error("gemini"))
    }

    /// Build `models/{model}:{method}` against the configured base URL
    fn endpoint(&self, method: &str) -> LlmResult<Url> {
        let mut base = self
            .config
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_API_URL.to_string());
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| LlmError::InvalidRequest {
            message: format!("Invalid Gemini base URL '{}': {}", base, e),
        })?;
        base.join(&format!("models/{}:{}", self.config.model, method))
            .map_err(|e| LlmError::InvalidRequest {
                message: format!("Invalid Gemini endpoint: {}", e),
            })
    }

    /// Build the request body for the API
    fn build_request_body(
        &self,
        messages: &[Message],
        system: Option<&str>,
        options: &LlmRequestOptions,
    ) -> serde_json::Value {
        let mut generation_config = json!({
            "maxOutputTokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });
        if options.response_format == ResponseFormat::Json {
            generation_config["responseMimeType"] = json!("application/json");
        }

        let mut body = json!({
            "contents": contents_for(messages),
            "generationConfig": generation_config,
        });

        if let Some(sys) = system.filter(|s| !s.trim().is_empty()) {
            body["systemInstruction"] = json!({ "parts": [{ "text": sys }] });
        }

        body
    }

    async fn post(&self, url: Url, body: &serde_json::Value) -> LlmResult<reqwest::Response> {
        let api_key = self.api_key()?;

        tracing::debug!(model = %self.config.model, url = %url.path(), "gemini request");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status, &body_text, "gemini"));
        }
        Ok(response)
    }
}

/// Convert messages to Gemini `contents`, applying the user-first shim.
fn contents_for(messages: &[Message]) -> Vec<serde_json::Value> {
    let mut contents: Vec<serde_json::Value> = Vec::with_capacity(messages.len() + 1);

    if messages.first().map(|m| m.role) == Some(MessageRole::Assistant) {
        contents.push(json!({
            "role": "user",
            "parts": [{ "text": SESSION_START_TURN }],
        }));
    }

    for msg in messages {
        let role = match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        };
        contents.push(json!({
            "role": role,
            "parts": [{ "text": msg.content }],
        }));
    }

    contents
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let body = self.build_request_body(&messages, system.as_deref(), &options);
        let url = self.endpoint("generateContent")?;
        let response = self.post(url, &body).await?;

        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        if let Some(err) = &parsed.error {
            let code = err.status.clone().or_else(|| err.code.map(|c| c.to_string()));
            return Err(stream_error(
                err.message.as_deref().unwrap_or("unknown Gemini error"),
                code.as_deref(),
                "gemini",
            ));
        }

        let text = parsed.text();
        let stop_reason = parsed
            .finish_reason()
            .map(StopReason::from)
            .unwrap_or(StopReason::EndTurn);
        let usage = parsed
            .usage_metadata
            .as_ref()
            .map(|u| UsageStats {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(LlmResponse {
            content: if text.is_empty() { None } else { Some(text) },
            stop_reason,
            usage,
            model: parsed
                .model_version
                .unwrap_or_else(|| self.config.model.clone()),
        })
    }

    async fn stream_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tx: mpsc::Sender<UnifiedStreamEvent>,
        options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let body = self.build_request_body(&messages, system.as_deref(), &options);
        let mut url = self.endpoint("streamGenerateContent")?;
        url.query_pairs_mut().append_pair("alt", "sse");

        let response = self.post(url, &body).await?;

        let mut adapter = GeminiAdapter::new();
        pump_sse(response, &mut adapter, &tx, &self.config.model).await
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}
