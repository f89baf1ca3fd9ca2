//! Gemini SSE Stream Adapter
//!
//! Handles `streamGenerateContent?alt=sse` output. Every `data:` line is a
//! full `GenerateContentResponse` chunk carrying the next text parts, with
//! `finishReason` and cumulative `usageMetadata` on the final chunk.

use serde::Deserialize;
use strengths_coach_core::streaming::{sse_data, AdapterError, StreamAdapter, UnifiedStreamEvent};

/// A `GenerateContentResponse`, streamed or not.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    /// Finish reason of the first candidate, or the prompt block reason.
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
            .or_else(|| {
                self.prompt_feedback
                    .as_ref()
                    .and_then(|f| f.block_reason.as_deref())
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Adapter for Gemini SSE format
#[derive(Debug, Default)]
pub struct GeminiAdapter {
    completed: bool,
}

impl GeminiAdapter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamAdapter for GeminiAdapter {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn adapt(&mut self, input: &str) -> Result<Vec<UnifiedStreamEvent>, AdapterError> {
        let Some(data) = sse_data(input) else {
            return Ok(vec![]);
        };

        if !data.starts_with('{') {
            return Err(AdapterError::InvalidFormat(format!(
                "expected a JSON object, got: {}",
                data.chars().take(40).collect::<String>()
            )));
        }

        let chunk: GenerateContentResponse =
            serde_json::from_str(data).map_err(|e| AdapterError::ParseError(e.to_string()))?;

        if let Some(err) = chunk.error {
            let code = err
                .status
                .or_else(|| err.code.map(|c| c.to_string()));
            return Ok(vec![UnifiedStreamEvent::Error {
                message: err.message.unwrap_or_else(|| "unknown Gemini error".to_string()),
                code,
            }]);
        }

        let mut events = vec![];

        let text = chunk.text();
        if !text.is_empty() {
            events.push(UnifiedStreamEvent::TextDelta { content: text });
        }

        if let Some(usage) = &chunk.usage_metadata {
            events.push(UnifiedStreamEvent::Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            });
        }

        if let Some(reason) = chunk.finish_reason() {
            if !self.completed {
                self.completed = true;
                events.push(UnifiedStreamEvent::Complete {
                    stop_reason: Some(reason.to_string()),
                });
            }
        }

        Ok(events)
    }

    fn reset(&mut self) {
        self.completed = false;
    }
}
