use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyLevel {
    Public,
    #[default]
    Private,
    Protected,
}

/// A named persona with its own preamble and chat model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub creator_id: Option<String>,
    pub name: String,
    pub slug: String,
    pub personality: Option<String>,
    #[serde(default)]
    pub privacy_level: PrivacyLevel,
    pub chat_model_id: Option<String>,
    #[serde(default)]
    pub input_tools: Vec<String>,
    #[serde(default)]
    pub output_modes: Vec<String>,
    pub style_color: Option<String>,
    pub style_icon: Option<String>,
    #[serde(default)]
    pub is_hidden: bool,
    #[serde(default)]
    pub managed_by_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(name: impl Into<String>, creator_id: Option<String>) -> Self {
        let name = name.into();
        let now = Utc::now();
        Self {
            id: crate::new_id(),
            creator_id,
            slug: generate_slug(&name),
            name,
            personality: None,
            privacy_level: PrivacyLevel::default(),
            chat_model_id: None,
            input_tools: Vec::new(),
            output_modes: Vec::new(),
            style_color: None,
            style_icon: None,
            is_hidden: false,
            managed_by_admin: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// `"Budget Helper"` becomes `"budget-helper-<6 digits>"`.
pub fn generate_slug(name: &str) -> String {
    let base = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    let suffix = uuid::Uuid::new_v4().as_u128() % 1_000_000;
    format!("{}-{:06}", base, suffix)
}
