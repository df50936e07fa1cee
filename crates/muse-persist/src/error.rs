use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    /// An assistant reply referenced a turn that has no user message, or
    /// one that was already answered.
    #[error("Unpaired turn {turn_id} in conversation {conversation_id}")]
    UnpairedTurn {
        conversation_id: String,
        turn_id: String,
    },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;
