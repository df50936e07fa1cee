use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainOfThought {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: String,
}

/// Reference to an entry the reply drew on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextReference {
    pub compiled: String,
    pub file: Option<String>,
}

/// Auxiliary data carried only by assistant events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssistantContext {
    #[serde(default)]
    pub train_of_thought: Vec<TrainOfThought>,
    #[serde(default)]
    pub context: Vec<ContextReference>,
    #[serde(default)]
    pub online_context: serde_json::Value,
    #[serde(default)]
    pub code_context: serde_json::Value,
    #[serde(default)]
    pub images: Vec<String>,
    pub mermaid_diagram: Option<String>,
    pub chat_model_id: Option<String>,
    pub agent_id: Option<String>,
}

/// One message event in a conversation log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub id: String,
    pub conversation_id: String,
    pub turn_id: String,
    pub by: Speaker,
    pub message: String,
    /// Insertion order within the conversation, assigned by the backend
    #[serde(default)]
    pub seq: i64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assistant: Option<AssistantContext>,
}

impl ChatEvent {
    pub fn user(conversation_id: impl Into<String>, turn_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: muse_types::new_id(),
            conversation_id: conversation_id.into(),
            turn_id: turn_id.into(),
            by: Speaker::User,
            message: message.into(),
            seq: 0,
            created_at: Utc::now(),
            assistant: None,
        }
    }

    pub fn assistant(
        conversation_id: impl Into<String>,
        turn_id: impl Into<String>,
        message: impl Into<String>,
        context: AssistantContext,
    ) -> Self {
        Self {
            id: muse_types::new_id(),
            conversation_id: conversation_id.into(),
            turn_id: turn_id.into(),
            by: Speaker::Assistant,
            message: message.into(),
            seq: 0,
            created_at: Utc::now(),
            assistant: Some(context),
        }
    }
}

/// A user event paired with its reply, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub turn_id: String,
    pub user: ChatEvent,
    pub assistant: Option<ChatEvent>,
}

impl Turn {
    pub fn is_complete(&self) -> bool {
        self.assistant.is_some()
    }
}
