//! Provider-Specific Stream Adapters
//!
//! Each adapter handles the unique streaming format of its provider. The
//! shared pump below turns a reqwest byte stream into unified events.

pub mod gemini;
pub mod openai;

pub use gemini::GeminiAdapter;
pub use openai::OpenAIAdapter;

use futures_util::StreamExt;
use strengths_coach_core::streaming::{StreamAdapter, UnifiedStreamEvent};
use tokio::sync::mpsc;

use crate::provider::stream_error;
use crate::types::{LlmError, LlmResponse, LlmResult, StopReason, UsageStats};

/// Splits a byte stream into lines.
///
/// Bytes are buffered until a newline arrives so multi-byte characters split
/// across network chunks are decoded whole.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    /// Append a chunk and return every line it completed.
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]);
            lines.push(text.trim_end_matches('\r').to_string());
        }
        lines
    }

    /// Trailing bytes left once the stream ends without a final newline.
    pub(crate) fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        let text = String::from_utf8_lossy(&rest).trim().to_string();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Running totals collected while events are forwarded.
#[derive(Debug, Default)]
struct StreamAccumulator {
    content: String,
    usage: UsageStats,
    stop_reason: Option<StopReason>,
}

/// What to do after handling one adapted event.
enum Flow {
    Continue,
    ReceiverGone,
}

impl StreamAccumulator {
    async fn handle(
        &mut self,
        event: UnifiedStreamEvent,
        tx: &mpsc::Sender<UnifiedStreamEvent>,
        provider: &str,
    ) -> LlmResult<Flow> {
        match &event {
            UnifiedStreamEvent::TextDelta { content } => {
                if content.is_empty() {
                    return Ok(Flow::Continue);
                }
                self.content.push_str(content);
            }
            UnifiedStreamEvent::Usage {
                input_tokens,
                output_tokens,
            } => {
                self.usage.input_tokens = *input_tokens;
                self.usage.output_tokens = *output_tokens;
            }
            UnifiedStreamEvent::Complete { stop_reason } => {
                self.stop_reason = Some(
                    stop_reason
                        .as_deref()
                        .map(StopReason::from)
                        .unwrap_or(StopReason::EndTurn),
                );
            }
            UnifiedStreamEvent::Error { message, code } => {
                return Err(stream_error(message, code.as_deref(), provider));
            }
        }

        if tx.send(event).await.is_err() {
            return Ok(Flow::ReceiverGone);
        }
        Ok(Flow::Continue)
    }

    fn into_response(self, model: &str) -> LlmResponse {
        LlmResponse {
            content: if self.content.is_empty() {
                None
            } else {
                Some(self.content)
            },
            stop_reason: self.stop_reason.unwrap_or(StopReason::EndTurn),
            usage: self.usage,
            model: model.to_string(),
        }
    }
}

/// Read an SSE response to the end, forwarding adapted events to `tx`.
///
/// Stops early (without error) when the receiver is dropped. An in-stream
/// error event aborts with the mapped `LlmError`.
pub(crate) async fn pump_sse<A: StreamAdapter>(
    response: reqwest::Response,
    adapter: &mut A,
    tx: &mpsc::Sender<UnifiedStreamEvent>,
    model: &str,
) -> LlmResult<LlmResponse> {
    let provider = adapter.provider_name();
    let mut acc = StreamAccumulator::default();
    let mut lines = LineBuffer::default();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        for line in lines.push(&chunk) {
            if let Flow::ReceiverGone = adapt_line(adapter, &line, &mut acc, tx, provider).await? {
                tracing::debug!(provider, "stream receiver dropped, stopping read");
                return Ok(acc.into_response(model));
            }
        }
    }

    if let Some(line) = lines.finish() {
        adapt_line(adapter, &line, &mut acc, tx, provider).await?;
    }

    Ok(acc.into_response(model))
}

async fn adapt_line<A: StreamAdapter>(
    adapter: &mut A,
    line: &str,
    acc: &mut StreamAccumulator,
    tx: &mpsc::Sender<UnifiedStreamEvent>,
    provider: &str,
) -> LlmResult<Flow> {
    let events = match adapter.adapt(line) {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!(provider, error = %e, "skipping unparseable stream line");
            return Ok(Flow::Continue);
        }
    };
    for event in events {
        if let Flow::ReceiverGone = acc.handle(event, tx, provider).await? {
            return Ok(Flow::ReceiverGone);
        }
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_buffer_splits_lines() {
        let mut buf = LineBuffer::default();
        assert!(buf.push(b"data: a").is_empty());
        let lines = buf.push(b"bc\r\n\ndata: d\n");
        assert_eq!(lines, vec!["data: abc", "", "data: d"]);
        assert!(buf.finish().is_none());
    }

    #[test]
    fn test_line_buffer_keeps_split_multibyte_chars() {
        let text = "data: こんにちは\n";
        let bytes = text.as_bytes();
        // Split inside the first multi-byte character.
        let (a, b) = bytes.split_at(8);
        let mut buf = LineBuffer::default();
        assert!(buf.push(a).is_empty());
        assert_eq!(buf.push(b), vec!["data: こんにちは"]);
    }

    #[test]
    fn test_line_buffer_finish_returns_trailing_text() {
        let mut buf = LineBuffer::default();
        buf.push(b"data: [DONE]");
        assert_eq!(buf.finish().as_deref(), Some("data: [DONE]"));
    }

    #[tokio::test]
    async fn test_accumulator_collects_text_and_forwards() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut acc = StreamAccumulator::default();

        for event in [
            UnifiedStreamEvent::TextDelta {
                content: "こんにちは".to_string(),
            },
            UnifiedStreamEvent::TextDelta {
                content: String::new(),
            },
            UnifiedStreamEvent::TextDelta {
                content: "！".to_string(),
            },
            UnifiedStreamEvent::Complete {
                stop_reason: Some("STOP".to_string()),
            },
        ] {
            assert!(matches!(
                acc.handle(event, &tx, "gemini").await,
                Ok(Flow::Continue)
            ));
        }
        drop(tx);

        let mut forwarded = Vec::new();
        while let Some(event) = rx.recv().await {
            forwarded.push(event);
        }
        // The empty delta is not forwarded.
        assert_eq!(forwarded.len(), 3);

        let response = acc.into_response("gemini-flash-latest");
        assert_eq!(response.content.as_deref(), Some("こんにちは！"));
        assert_eq!(response.stop_reason, StopReason::EndTurn);
    }

    #[tokio::test]
    async fn test_accumulator_error_event_aborts() {
        let (tx, _rx) = mpsc::channel(8);
        let mut acc = StreamAccumulator::default();
        let result = acc
            .handle(
                UnifiedStreamEvent::Error {
                    message: "quota".to_string(),
                    code: Some("RESOURCE_EXHAUSTED".to_string()),
                },
                &tx,
                "gemini",
            )
            .await;
        match result {
            Err(e) => assert!(e.is_quota_exhausted()),
            Ok(_) => panic!("expected error"),
        }
    }

    #[tokio::test]
    async fn test_accumulator_reports_dropped_receiver() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut acc = StreamAccumulator::default();
        let flow = acc
            .handle(
                UnifiedStreamEvent::TextDelta {
                    content: "x".to_string(),
                },
                &tx,
                "openai",
            )
            .await;
        assert!(matches!(flow, Ok(Flow::ReceiverGone)));
    }
}
