use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    #[default]
    Openai,
    Google,
    Anthropic,
    Offline,
}

/// Credentials for reaching a hosted model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiModelApi {
    pub name: String,
    pub api_key: String,
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatModel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub model_type: ModelType,
    #[serde(default = "default_price_tier")]
    pub price_tier: String,
    #[serde(default)]
    pub vision_enabled: bool,
    pub description: Option<String>,
    pub ai_model_api: Option<AiModelApi>,
}

fn default_price_tier() -> String {
    "free".to_string()
}

impl ChatModel {
    pub fn new(name: impl Into<String>, model_type: ModelType) -> Self {
        Self {
            id: crate::new_id(),
            name: name.into(),
            model_type,
            price_tier: default_price_tier(),
            vision_enabled: false,
            description: None,
            ai_model_api: None,
        }
    }

    pub fn with_api(mut self, api: AiModelApi) -> Self {
        self.ai_model_api = Some(api);
        self
    }

    /// Non-empty API key, if one is configured
    pub fn api_key(&self) -> Option<&str> {
        self.ai_model_api
            .as_ref()
            .map(|api| api.api_key.as_str())
            .filter(|key| !key.is_empty())
    }
}
