use muse_persist::PersistError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Agent not accessible: {0}")]
    AgentForbidden(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PersistError),
}

impl RelayError {
    /// A conversation lookup that misses stays a not-found; anything else
    /// is a storage failure.
    pub(crate) fn from_lookup(err: PersistError, conversation_id: &str) -> Self {
        match err {
            PersistError::ConversationNotFound(_) => RelayError::ConversationNotFound(conversation_id.to_string()),
            other => RelayError::Storage(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
