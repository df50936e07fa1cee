use crate::streaming::StreamEvent;
use crate::types::Message;
use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use serde_json::{Map, Value};
use std::pin::Pin;

/// Fragments of one streamed completion, ending with `StreamEvent::Done`
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// A hosted chat model.
///
/// `chat_stream` fails up front when the provider rejects the request, so
/// status codes never arrive as stream items.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream>;
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(self, options: ChatOptions) -> Self {
        Self { options, ..self }
    }
}

/// Sampling knobs. Unset fields are left to the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(self, temperature: f32) -> Self {
        Self { temperature: Some(temperature), ..self }
    }

    pub fn max_tokens(self, max_tokens: u32) -> Self {
        Self { max_tokens: Some(max_tokens), ..self }
    }

    /// Add the set fields to a request body
    pub(crate) fn write_into(&self, body: &mut Map<String, Value>) {
        if let Some(t) = self.temperature {
            body.insert("temperature".into(), Value::from(t));
        }
        if let Some(n) = self.max_tokens {
            body.insert("max_tokens".into(), Value::from(n));
        }
    }
}
