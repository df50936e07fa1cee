// Provider configuration and client factory

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::openai::client::{OpenAIClient, OPENAI_API_BASE};
use crate::traits::ChatClient;

/// OpenAI-compatible endpoint for Gemini models
pub const GOOGLE_OPENAI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// Type of LLM provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    #[default]
    OpenAI,
    Google,
}

impl ProviderType {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderType::OpenAI => OPENAI_API_BASE,
            ProviderType::Google => GOOGLE_OPENAI_BASE,
        }
    }
}

/// Complete provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub provider: ProviderType,
    pub api_key: String,
    /// Overrides the provider's default base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::OpenAI,
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn google(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderType::Google,
            api_key: api_key.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_chat_client(config: &ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        let client = OpenAIClient::with_base_url(config.api_key.clone(), config.resolved_base_url())?;
        Ok(Arc::new(client))
    }
}
