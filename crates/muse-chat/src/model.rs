use std::sync::Arc;

use async_trait::async_trait;
use muse_persist::PersistenceClient;
use muse_types::{Agent, ChatModel, ModelType};

use crate::error::Result;

/// Model the relay will call, with everything needed to reach it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedModel {
    pub chat_model: ChatModel,
    /// Name as sent to the provider
    pub model_name: String,
    pub api_key: String,
    pub base_url: Option<String>,
}

/// Configuration the relay could not find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigGap {
    NoDefaultModel,
    NoApiKey,
}

impl ConfigGap {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigGap::NoDefaultModel => "Error: No default chat model configured",
            ConfigGap::NoApiKey => "Error: No API key configured for chat model",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelResolution {
    Ready(ResolvedModel),
    Missing(ConfigGap),
}

/// Chooses the chat model for a request
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// The agent's chat model wins over the server default
    async fn resolve(&self, agent: Option<&Agent>) -> Result<ModelResolution>;
}

/// Provider names for Google models, from the loose names people configure
pub fn normalize_model_name(model_type: ModelType, name: &str) -> String {
    if model_type != ModelType::Google {
        return name.to_string();
    }

    let lower = name.to_lowercase();
    let resolved = if !lower.contains("gemini") {
        "gemini-2.0-flash"
    } else if lower.contains("2.5") {
        if lower.contains("flash") {
            "gemini-2.5-flash-preview-05-20"
        } else {
            "gemini-2.5-pro-preview-05-06"
        }
    } else if lower.contains("2.0") || lower.contains("flash-2") {
        "gemini-2.0-flash"
    } else if lower.contains("1.5") {
        if lower.contains("flash") {
            "gemini-1.5-flash"
        } else {
            "gemini-1.5-pro"
        }
    } else {
        "gemini-2.0-flash"
    };
    resolved.to_string()
}

/// Resolves models from the chat models stored in persistence
pub struct StoreModelProvider {
    client: Arc<dyn PersistenceClient>,
}

impl StoreModelProvider {
    pub fn new(client: Arc<dyn PersistenceClient>) -> Self {
        Self { client }
    }

    /// Configured default, else the first stored model
    pub async fn default_model(&self) -> Result<Option<ChatModel>> {
        if let Some(id) = self.client.get_default_chat_model_id().await? {
            if let Some(model) = self.client.get_chat_model(&id).await? {
                return Ok(Some(model));
            }
            tracing::warn!(model_id = %id, "default chat model id points at a missing model");
        }
        Ok(self.client.list_chat_models().await?.into_iter().next())
    }
}

#[async_trait]
impl ModelProvider for StoreModelProvider {
    async fn resolve(&self, agent: Option<&Agent>) -> Result<ModelResolution> {
        let mut chosen = None;
        if let Some(model_id) = agent.and_then(|a| a.chat_model_id.as_deref()) {
            chosen = self.client.get_chat_model(model_id).await?;
        }
        let chat_model = match chosen {
            Some(model) => model,
            None => match self.default_model().await? {
                Some(model) => model,
                None => return Ok(ModelResolution::Missing(ConfigGap::NoDefaultModel)),
            },
        };

        let Some(api_key) = chat_model.api_key().map(str::to_string) else {
            return Ok(ModelResolution::Missing(ConfigGap::NoApiKey));
        };

        Ok(ModelResolution::Ready(ResolvedModel {
            model_name: normalize_model_name(chat_model.model_type, &chat_model.name),
            api_key,
            base_url: chat_model.ai_model_api.as_ref().and_then(|api| api.api_base_url.clone()),
            chat_model,
        }))
    }
}
