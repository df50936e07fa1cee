use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONVERSATION_TITLE: &str = "New Conversation";

/// Database-agnostic conversation (session) record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub agent_id: Option<String>,
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub file_filters: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(user_id: impl Into<String>, agent_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: muse_types::new_id(),
            user_id: user_id.into(),
            agent_id,
            title: Some(DEFAULT_CONVERSATION_TITLE.to_string()),
            slug: None,
            file_filters: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Replacement metadata for a conversation. A missing slug keeps the
/// current one; every other field is replaced as given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub agent_id: Option<String>,
    pub file_filters: Vec<String>,
}

impl ConversationUpdate {
    pub(crate) fn apply(self, conversation: &mut Conversation) {
        conversation.title = self.title;
        if self.slug.is_some() {
            conversation.slug = self.slug;
        }
        conversation.agent_id = self.agent_id;
        conversation.file_filters = self.file_filters;
        conversation.updated_at = Utc::now();
    }
}
