pub mod access;
pub mod agent;
pub mod chat_model;
pub mod content;
pub mod events;
pub mod search;

pub use access::{AccessPolicy, Caller, DefaultAccessPolicy};
pub use agent::{Agent, PrivacyLevel};
pub use chat_model::{AiModelApi, ChatModel, ModelType};
pub use content::{Entry, FileObject, SourceType};
pub use events::RelayEvent;
pub use search::{SearchResult, SearchType};

/// Fresh identifier for any stored record
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
