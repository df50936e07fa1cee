use futures::StreamExt;
use reqwest::Response;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::traits::EventStream;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Reply text fragment
    Message { content: String },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

impl StreamEvent {
    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done { .. })
    }
}

/// One `chat.completion.chunk` object. Providers disagree on the optional
/// fields, so only `choices` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Delta,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    pub role: Option<String>,
    pub content: Option<String>,
}

impl ChatStreamChunk {
    pub fn content(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.delta.content.as_deref())
    }

    /// Text first, then the terminal event if the provider finished
    pub fn into_events(self) -> Vec<StreamEvent> {
        let Some(choice) = self.choices.into_iter().next() else {
            return Vec::new();
        };
        let mut events = Vec::with_capacity(2);
        if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
            events.push(StreamEvent::Message { content });
        }
        if let Some(reason) = choice.finish_reason {
            events.push(StreamEvent::Done {
                finish_reason: Some(reason),
            });
        }
        events
    }
}

/// Payload of one `data:` line
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SsePayload {
    Json(String),
    /// The `[DONE]` sentinel
    End,
}

/// Splits a byte stream into SSE `data:` payloads.
///
/// Lines are only decoded once complete, so multi-byte characters split
/// across network reads survive. Comments, blank lines and other fields
/// (`event:`, `id:`) are skipped.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: VecDeque<u8>,
}

impl SseDecoder {
    pub(crate) fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    pub(crate) fn next_payload(&mut self) -> Option<SsePayload> {
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let Ok(line) = std::str::from_utf8(&line) else {
                tracing::debug!("skipping non-utf8 sse line");
                continue;
            };
            let Some(data) = line.trim().strip_prefix("data:").map(str::trim_start) else {
                continue;
            };
            if data == "[DONE]" {
                return Some(SsePayload::End);
            }
            if !data.is_empty() {
                return Some(SsePayload::Json(data.to_string()));
            }
        }
        None
    }
}

/// Turn an OpenAI-compatible `text/event-stream` body into stream events.
///
/// The stream ends after the first `Done`, whether it came from a
/// `finish_reason` or the `[DONE]` sentinel. A transport error is yielded
/// once and ends the stream.
pub fn parse_chat_sse_stream(response: Response) -> EventStream {
    let mut bytes = response.bytes_stream();

    Box::pin(async_stream::stream! {
        let mut decoder = SseDecoder::default();

        'read: while let Some(read) = bytes.next().await {
            let chunk = match read {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break;
                }
            };
            decoder.push(&chunk);

            while let Some(payload) = decoder.next_payload() {
                let data = match payload {
                    SsePayload::End => {
                        yield Ok(StreamEvent::Done { finish_reason: None });
                        break 'read;
                    }
                    SsePayload::Json(data) => data,
                };

                match serde_json::from_str::<ChatStreamChunk>(&data) {
                    Ok(parsed) => {
                        for event in parsed.into_events() {
                            let done = event.is_done();
                            yield Ok(event);
                            if done {
                                break 'read;
                            }
                        }
                    }
                    Err(e) => yield Err(anyhow::anyhow!("Failed to parse chat chunk: {}", e)),
                }
            }
        }
    })
}
