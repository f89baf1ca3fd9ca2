//! LLM Provider Trait
//!
//! Defines the common interface for all LLM providers.

use async_trait::async_trait;
use strengths_coach_core::streaming::UnifiedStreamEvent;
use tokio::sync::mpsc;

use crate::types::{LlmError, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig};

/// Trait that all LLM providers must implement.
///
/// Provides a unified interface for:
/// - Single message completions (send_message)
/// - Streaming completions (stream_message)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification.
    fn name(&self) -> &'static str;

    /// Returns the current model being used.
    fn model(&self) -> &str;

    /// Send a message and get a complete response.
    ///
    /// # Arguments
    /// * `messages` - Conversation history, newest last
    /// * `system` - Optional system prompt
    /// * `options` - Per-request overrides such as JSON output mode
    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse>;

    /// Stream a message response via a channel.
    ///
    /// Text deltas are forwarded to `tx` as they arrive. An error reported
    /// inside the stream body ends the call with `Err`; deltas already sent
    /// stay sent.
    ///
    /// # Returns
    /// Final complete response after streaming
    async fn stream_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        tx: mpsc::Sender<UnifiedStreamEvent>,
        options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse>;

    /// Get the configuration for this provider.
    fn config(&self) -> &ProviderConfig;
}

/// Helper function to create an error for missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Pull a human-readable message out of a JSON error body.
///
/// Both Gemini and OpenAI wrap failures as `{"error": {"message": ...}}`.
fn error_body_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Helper function to parse HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    let message = error_body_message(body);

    if body.contains("RESOURCE_EXHAUSTED") || body.contains("insufficient_quota") {
        return LlmError::RateLimited {
            message: format!("{}: {}", provider, message),
            retry_after: None,
        };
    }

    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound { model: message },
        429 => LlmError::RateLimited {
            message: format!("{}: {}", provider, message),
            retry_after: None,
        },
        400 => LlmError::InvalidRequest { message },
        500..=599 => LlmError::ServerError {
            message,
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, message),
        },
    }
}

/// Map an error event reported inside a stream body to an `LlmError`.
pub fn stream_error(message: &str, code: Option<&str>, provider: &str) -> LlmError {
    match code {
        Some("RESOURCE_EXHAUSTED") | Some("429") | Some("rate_limit_exceeded")
        | Some("insufficient_quota") => LlmError::RateLimited {
            message: format!("{}: {}", provider, message),
            retry_after: None,
        },
        Some(code) => LlmError::ServerError {
            message: format!("{} ({})", message, code),
            status: None,
        },
        None => LlmError::ServerError {
            message: message.to_string(),
            status: None,
        },
    }
}
