//! OpenAI SSE Stream Adapter
//!
//! Handles the chat-completions SSE format shared by OpenAI and compatible
//! gateways.

use serde::Deserialize;
use strengths_coach_core::streaming::{sse_data, AdapterError, StreamAdapter, UnifiedStreamEvent};

/// Internal event types from OpenAI API
#[derive(Debug, Deserialize)]
struct OpenAIEvent {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Option<Delta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Adapter for OpenAI API format
#[derive(Debug, Default)]
pub struct OpenAIAdapter;

impl OpenAIAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl StreamAdapter for OpenAIAdapter {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn adapt(&mut self, input: &str) -> Result<Vec<UnifiedStreamEvent>, AdapterError> {
        let Some(data) = sse_data(input) else {
            return Ok(vec![]);
        };

        // Completion is signalled by finish_reason; the sentinel carries nothing.
        if data == "[DONE]" {
            return Ok(vec![]);
        }

        let event: OpenAIEvent =
            serde_json::from_str(data).map_err(|e| AdapterError::ParseError(e.to_string()))?;

        if let Some(err) = event.error {
            let code = err.code.map(|c| match c {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            return Ok(vec![UnifiedStreamEvent::Error {
                message: err.message.unwrap_or_else(|| "unknown OpenAI error".to_string()),
                code,
            }]);
        }

        let mut events = vec![];

        for choice in event.choices {
            if let Some(content) = choice.delta.and_then(|d| d.content) {
                if !content.is_empty() {
                    events.push(UnifiedStreamEvent::TextDelta { content });
                }
            }
            if let Some(reason) = choice.finish_reason {
                events.push(UnifiedStreamEvent::Complete {
                    stop_reason: Some(reason),
                });
            }
        }

        if let Some(usage) = event.usage {
            events.push(UnifiedStreamEvent::Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            });
        }

        Ok(events)
    }
}
