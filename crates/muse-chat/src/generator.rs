use async_trait::async_trait;
use muse_llm::{ChatOptions, ChatRequest, ClientFactory, EventStream, Message, ProviderConfig};
use muse_types::ModelType;

use crate::model::ResolvedModel;

/// External generation service: turns a prompt into a stream of fragments
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, model: &ResolvedModel, messages: Vec<Message>) -> anyhow::Result<EventStream>;
}

/// Generator backed by an OpenAI-compatible chat completions endpoint
#[derive(Debug, Clone, Default)]
pub struct LlmGenerator {
    options: ChatOptions,
}

impl LlmGenerator {
    pub fn new(options: ChatOptions) -> Self {
        Self { options }
    }

    fn provider_config(model: &ResolvedModel) -> ProviderConfig {
        let config = match model.chat_model.model_type {
            ModelType::Google => ProviderConfig::google(model.api_key.clone()),
            _ => ProviderConfig::openai(model.api_key.clone()),
        };
        match &model.base_url {
            Some(base_url) => config.with_base_url(base_url.clone()),
            None => config,
        }
    }
}

#[async_trait]
impl Generator for LlmGenerator {
    async fn generate(&self, model: &ResolvedModel, messages: Vec<Message>) -> anyhow::Result<EventStream> {
        let client = ClientFactory::create_chat_client(&Self::provider_config(model))?;
        let request = ChatRequest::new(model.model_name.clone(), messages).with_options(self.options);
        client.chat_stream(request).await
    }
}
