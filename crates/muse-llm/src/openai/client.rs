// OpenAI-compatible chat completions client.
// Any provider exposing `/chat/completions` (OpenAI, Gemini's compatibility
// endpoint, local servers) is reachable by changing the base URL.

use crate::error::ProviderError;
use crate::streaming::parse_chat_sse_stream;
use crate::traits::{ChatClient, ChatRequest, EventStream};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Map, Value};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// HTTP client for OpenAI-style chat completion APIs
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, OPENAI_API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_completion(&self, payload: &Value) -> Result<reqwest::Response> {
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status, "chat completion rejected by provider");
            return Err(ProviderError::new(status, error_text).into());
        }

        Ok(response)
    }
}

/// Request body for `/chat/completions`
fn completion_body(request: &ChatRequest, stream: bool) -> Value {
    let messages: Vec<Value> = request
        .messages
        .iter()
        .map(|m| json!({ "role": m.role(), "content": m.content().as_str() }))
        .collect();

    let mut body = Map::new();
    body.insert("model".into(), Value::from(request.model.as_str()));
    body.insert("messages".into(), Value::Array(messages));
    body.insert("stream".into(), Value::Bool(stream));
    request.options.write_into(&mut body);
    Value::Object(body)
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let response = self.post_completion(&completion_body(&request, true)).await?;

        Ok(parse_chat_sse_stream(response))
    }
}
